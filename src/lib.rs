mod batches;
mod config;
mod error;
mod load_data;
mod ons;
mod persist;
mod types;

pub use error::CargaError;
pub use ons::*;

pub use batches::{plan_batches, resolve_days_limit, BatchError, DEFAULT_DAYS_LIMIT};
pub use config::{
    ConfigError, GlobalConfig, SeriesConfig, Settings, CARGA_SERIES, DEFAULT_BASE_URL,
};
pub use persist::{save_table, PersistError};

pub use load_data::error::FetchError;
pub use load_data::finalize::{finalize_load_table, OUTPUT_COLUMNS};

pub use types::area::{AreaCategory, AreaCode, AreaCodeError};
pub use types::date_range::DateRange;
pub use types::endpoint::{Endpoint, FieldKind, FieldSpec};
