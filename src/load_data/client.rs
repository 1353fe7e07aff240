use crate::load_data::error::FetchError;
use crate::types::area::AreaCode;
use crate::types::date_range::DateRange;
use crate::types::endpoint::Endpoint;
use log::{info, warn};
use reqwest::blocking::Client;
use serde_json::{Map, Value};
use std::time::Duration;

/// A raw response item, before any column selection.
pub(crate) type RawRecord = Map<String, Value>;

/// Blocking HTTP access to the load endpoints. One call, one request.
pub struct LoadClient {
    base_url: String,
    http: Client,
}

impl LoadClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(FetchError::ClientBuild)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests one endpoint for one area and date range and returns the
    /// decoded JSON array.
    pub(crate) fn get_records(
        &self,
        endpoint: Endpoint,
        area: AreaCode,
        range: DateRange,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint.path());

        let response = self
            .http
            .get(&url)
            .query(&[
                ("dat_inicio", range.start_param()),
                ("dat_fim", range.end_param()),
                ("cod_areacarga", area.code().to_string()),
            ])
            .send()
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;

        info!("{}\t{}", response.status().as_u16(), response.url());

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(url, e)
                });
            }
        };

        let body = response
            .text()
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;

        serde_json::from_str(&body).map_err(|source| FetchError::JsonParse { url, source })
    }
}
