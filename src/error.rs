use crate::batches::BatchError;
use crate::config::ConfigError;
use crate::load_data::error::FetchError;
use crate::persist::PersistError;
use crate::types::area::AreaCodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CargaError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    AreaCode(#[from] AreaCodeError),
}
