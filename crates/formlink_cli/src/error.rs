//! Error types for the CLI.

use formlink_store::StoreError;
use formlink_sync::{ConfigurationError, SyncError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by CLI commands.
#[derive(Error, Debug)]
pub enum CliError {
    /// The schema file could not be read.
    #[error("cannot read {path:?}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The schema file is not valid JSON or has the wrong shape.
    #[error("invalid schema: {0}")]
    Schema(#[from] serde_json::Error),

    /// Sync engine failure, including invalid field definitions.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Unsupported command-line input.
    #[error("{0}")]
    Usage(String),
}

impl From<ConfigurationError> for CliError {
    fn from(err: ConfigurationError) -> Self {
        CliError::Sync(err.into())
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        CliError::Sync(err.into())
    }
}

impl CliError {
    /// Creates a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        CliError::Usage(message.into())
    }
}
