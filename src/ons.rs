//! Main entry point for fetching ONS load data.
//!
//! [`OnsCarga`] plans the date batches, requests every endpoint of a series for
//! every area and batch, merges the responses and hands back one finished
//! table, which can then be written out with [`OnsCarga::save`].

use crate::batches::{plan_batches, resolve_days_limit};
use crate::config::{GlobalConfig, SeriesConfig, DEFAULT_BASE_URL};
use crate::error::CargaError;
use crate::load_data::client::LoadClient;
use crate::load_data::fetch_load_table;
use crate::persist::save_table;
use crate::types::area::AreaCode;
use bon::bon;
use chrono::{Local, NaiveDate};
use log::info;
use polars::prelude::DataFrame;
use std::path::PathBuf;

/// Directory the table is written to when no other is given.
pub const DEFAULT_SAVE_DIR: &str = "data";

/// The client for the ONS load API.
///
/// Requests are made one at a time with a blocking HTTP client. Every call to
/// [`OnsCarga::fetch`] is independent: nothing is cached between calls.
///
/// Create an instance with [`OnsCarga::new()`] to talk to the public API,
/// [`OnsCarga::with_base_url()`] to point it somewhere else, or
/// [`OnsCarga::from_series()`] to take the URL and timeout from a series
/// configuration.
///
/// # Examples
///
/// ```rust
/// # use ons_carga::{CargaError, OnsCarga};
/// # fn run() -> Result<(), CargaError> {
/// let client = OnsCarga::new()?;
/// # Ok(())
/// # }
/// ```
pub struct OnsCarga {
    client: LoadClient,
}

#[bon]
impl OnsCarga {
    /// Creates a client for the public API at [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`CargaError::Fetch`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, CargaError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client sending its requests to `base_url`.
    ///
    /// A trailing slash is ignored, endpoint paths are appended as they are.
    ///
    /// # Errors
    ///
    /// Returns [`CargaError::Fetch`] if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, CargaError> {
        Ok(Self {
            client: LoadClient::new(base_url, None)?,
        })
    }

    /// Creates a client using the base URL and request timeout of `series`.
    ///
    /// # Errors
    ///
    /// Returns [`CargaError::Fetch`] if the HTTP client cannot be built.
    pub fn from_series(series: &SeriesConfig) -> Result<Self, CargaError> {
        Ok(Self {
            client: LoadClient::new(&series.base_url, series.request_timeout())?,
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Fetches the load table of a series.
    ///
    /// The requested period is split into batches (see [`crate::plan_batches`]).
    /// For each batch and each area, every configured endpoint is requested
    /// once and the responses are joined on area, date and instant. The
    /// accumulated rows are then reshaped into the columns listed in
    /// [`crate::OUTPUT_COLUMNS`].
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.series(&SeriesConfig)`: **Required.** Endpoints, column allowlist and batch span.
    /// * `.areas(Vec<AreaCode>)`: Optional. Areas to request. Defaults to the four subsystems; an empty list means the same.
    /// * `.date_from(NaiveDate)`: Optional. First day of the period. Without it a single batch reaching back `days_limit` days from `date_to` is requested.
    /// * `.date_to(NaiveDate)`: Optional. Last day of the period. Defaults to today.
    /// * `.days_limit(u32)`: Optional. Maximum span of one batch. Overrides the series' `days_limit`; [`crate::DEFAULT_DAYS_LIMIT`] applies when neither is set.
    ///
    /// # Errors
    ///
    /// Returns [`CargaError::Config`] if the series settings are invalid. No request is made in that case.
    /// Returns [`CargaError::Batch`] if `date_from` is after `date_to`, or if without `date_from` the single batch would start before the earliest representable date.
    /// Returns [`CargaError::Fetch`] for the first request that fails, responds with a non-2xx status, returns nothing or returns malformed records. The whole fetch is aborted.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use ons_carga::{AreaCode, CargaError, OnsCarga, SeriesConfig};
    /// # use chrono::NaiveDate;
    /// # fn main() -> Result<(), CargaError> {
    /// let client = OnsCarga::new()?;
    /// let series = SeriesConfig::default();
    ///
    /// let table = client
    ///     .fetch()
    ///     .series(&series)
    ///     .areas(vec![AreaCode::Seco, AreaCode::S])
    ///     .date_from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    ///     .date_to(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())
    ///     .call()?;
    ///
    /// println!("{}", table);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub fn fetch(
        &self,
        series: &SeriesConfig,
        areas: Option<Vec<AreaCode>>,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        days_limit: Option<u32>,
    ) -> Result<DataFrame, CargaError> {
        series.validate()?;
        let endpoints = series.resolve_endpoints()?;

        let areas = match areas {
            Some(areas) if !areas.is_empty() => areas,
            _ => AreaCode::subsystems(),
        };
        let date_to = date_to.unwrap_or_else(|| Local::now().date_naive());
        let days_limit = resolve_days_limit(days_limit, series.days_limit);

        let batches = plan_batches(date_from, date_to, days_limit)?;
        info!(
            "Fetching {} endpoints for {} areas in {} batches of up to {} days",
            endpoints.len(),
            areas.len(),
            batches.len(),
            days_limit
        );

        Ok(fetch_load_table(
            &self.client,
            series,
            &endpoints,
            &areas,
            &batches,
        )?)
    }

    /// Writes a fetched table to `<save_where>/<series.df_name>`.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.frame(DataFrame)`: **Required.** The table to write, usually the result of [`OnsCarga::fetch`].
    /// * `.series(&SeriesConfig)`: **Required.** Provides the file name.
    /// * `.global(&GlobalConfig)`: **Required.** Separator, decimal mark, encoding and float precision.
    /// * `.save_where(PathBuf)`: Optional. Output directory, created when missing. Defaults to [`DEFAULT_SAVE_DIR`].
    ///
    /// # Returns
    ///
    /// The table that was written, unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CargaError::Persist`] if the format settings are invalid or the file cannot be written.
    #[builder]
    pub fn save(
        &self,
        frame: DataFrame,
        series: &SeriesConfig,
        global: &GlobalConfig,
        save_where: Option<PathBuf>,
    ) -> Result<DataFrame, CargaError> {
        let dir = save_where.unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_DIR));
        Ok(save_table(frame, &dir, &series.df_name, global)?)
    }
}
