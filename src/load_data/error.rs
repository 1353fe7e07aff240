use crate::types::area::AreaCode;
use crate::types::date_range::DateRange;
use crate::types::endpoint::Endpoint;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse JSON response from {url}")]
    JsonParse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} returned no usable columns for area {area} in {range}")]
    EmptyResponse {
        endpoint: Endpoint,
        area: AreaCode,
        range: DateRange,
    },

    #[error("{endpoint} record {row} for area {area} lacks required field '{field}'")]
    MissingField {
        endpoint: Endpoint,
        area: AreaCode,
        row: usize,
        field: &'static str,
    },

    #[error("{endpoint} record {row} for area {area} has invalid '{field}': {value}")]
    InvalidField {
        endpoint: Endpoint,
        area: AreaCode,
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
