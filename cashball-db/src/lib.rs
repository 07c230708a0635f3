pub mod dataset;
pub mod error;
pub mod models;

pub use dataset::{ColumnNames, Dataset, Source};
pub use error::DatasetError;
