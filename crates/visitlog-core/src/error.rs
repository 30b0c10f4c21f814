use thiserror::Error;

/// Result type for core validation.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Validation failures of core value types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid domain: {0}")]
    InvalidDomain(String),
    #[error("invalid time range: {0}")]
    InvalidRange(String),
}

/// Errors raised by a [`DomainIndex`](crate::DomainIndex) backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    #[error("store operation timed out: {0}")]
    Timeout(String),
    #[error("store operation failed: {0}")]
    Operation(String),
}
