use thiserror::Error;

use cashball_db::DatasetError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("not enough draws: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("degenerate data: {0}")]
    DegenerateData(String),

    #[error("cash ball label {0} outside 1-4")]
    InvalidLabel(u8),

    #[error("invalid configuration: {0}")]
    Config(String),
}
