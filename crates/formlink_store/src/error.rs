//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing query parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store does not accept writes.
    #[error("query parameters are read-only (writing {key:?})")]
    ReadOnly {
        /// The key that was being written.
        key: String,
    },

    /// The host could not service the request.
    #[error("query parameters unavailable: {0}")]
    Unavailable(String),
}
