pub mod client;
pub mod error;
pub mod finalize;
mod merge;
mod normalize;

use crate::config::SeriesConfig;
use crate::load_data::client::LoadClient;
use crate::load_data::error::FetchError;
use crate::load_data::finalize::finalize_load_table;
use crate::load_data::merge::outer_join_on_keys;
use crate::load_data::normalize::{normalize_records, RequestContext};
use crate::types::area::AreaCode;
use crate::types::date_range::DateRange;
use crate::types::endpoint::Endpoint;
use log::{debug, info};
use polars::prelude::*;

/// Runs every (batch, area, endpoint) request and builds the final table.
///
/// Batches are the outer loop and areas the inner one, so chunks land in the
/// table batch by batch. Within one (batch, area) the endpoint tables are
/// joined in configured order. The first failing request aborts the whole
/// fetch.
pub(crate) fn fetch_load_table(
    client: &LoadClient,
    series: &SeriesConfig,
    endpoints: &[Endpoint],
    areas: &[AreaCode],
    batches: &[DateRange],
) -> Result<DataFrame, FetchError> {
    let mut chunks: Vec<LazyFrame> = Vec::with_capacity(batches.len() * areas.len());

    for &range in batches {
        for &area in areas {
            let mut merged: Option<DataFrame> = None;

            for &endpoint in endpoints {
                let ctx = RequestContext {
                    endpoint,
                    area,
                    range,
                };
                let records = client.get_records(endpoint, area, range)?;
                let table = normalize_records(ctx, &records, series)?;
                debug!(
                    "{} {} {}: {} rows, {} columns",
                    endpoint,
                    area,
                    range,
                    table.height(),
                    table.width()
                );

                merged = Some(match merged {
                    None => table,
                    Some(left) => outer_join_on_keys(left, table)?,
                });
            }

            if let Some(chunk) = merged {
                chunks.push(chunk.lazy());
            }
        }
    }

    let accumulated = if chunks.is_empty() {
        DataFrame::empty()
    } else {
        concat_lf_diagonal(chunks, UnionArgs::default())?.collect()?
    };
    info!(
        "Fetched {} rows over {} batches and {} areas",
        accumulated.height(),
        batches.len(),
        areas.len()
    );

    Ok(finalize_load_table(accumulated)?)
}
