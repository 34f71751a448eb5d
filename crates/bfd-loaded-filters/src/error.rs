//! Error types for the loaded-filter index

use thiserror::Error;

/// Errors that can occur while configuring or refreshing the index
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid false positive rate: {fpr} (must be strictly between 0 and 1)")]
    InvalidFPR { fpr: f64 },

    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Refresh task failed: {0}")]
    RefreshTask(String),
}

/// Errors raised by `LoadedBatchStore` implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),
}
