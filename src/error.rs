//! Error types for tronmock

use thiserror::Error;

/// Failures around the record store and the aggregations computed over it.
///
/// A malformed stored amount is a store-integrity error, not a "zero
/// balance": the aggregation touching that record fails instead of silently
/// masking bad data.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("record {hash}: transfer amount {amount:?} is not a decimal integer")]
    MalformedAmount { hash: String, amount: String },
    #[error("record {hash}: amount sum exceeds 256 bits")]
    AmountOverflow { hash: String },
    #[error("IO error: {0}")]
    Io(String),
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Json(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, StoreError>;
