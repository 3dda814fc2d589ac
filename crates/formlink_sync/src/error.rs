//! Error types for the sync engine.

use formlink_codec::{CodecError, ValueKind};
use formlink_store::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Mistakes in how widgets were set up.
///
/// These are raised as soon as they are detected and are never recovered
/// from; they point at a defect in the calling code, not at user input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// No default value was supplied.
    #[error("widget {key:?} has no default value")]
    MissingDefault {
        /// Widget key.
        key: String,
    },

    /// The default value cannot be encoded by the widget's codec.
    #[error("default of widget {key:?} is invalid: {source}")]
    InvalidDefault {
        /// Widget key.
        key: String,
        /// Why the default was rejected.
        source: CodecError,
    },

    /// Two widgets write the same query key with different codecs.
    #[error(
        "query key {param_key:?} is bound by {first:?} ({first_codec}) and {second:?} ({second_codec})"
    )]
    IncompatibleCodec {
        /// The shared query key.
        param_key: String,
        /// Widget bound first.
        first: String,
        /// Codec of the first widget.
        first_codec: String,
        /// Widget bound second.
        second: String,
        /// Codec of the second widget.
        second_codec: String,
    },

    /// Two widgets share a query key but disagree on its default.
    #[error("query key {param_key:?} has different defaults in {first:?} and {second:?}")]
    ConflictingDefaults {
        /// The shared query key.
        param_key: String,
        /// Widget bound first.
        first: String,
        /// Widget bound second.
        second: String,
    },

    /// The same widget key was bound twice in one pass.
    #[error("widget key {key:?} is used more than once")]
    DuplicateKey {
        /// Widget key.
        key: String,
    },

    /// Choice options were unusable.
    #[error("options of widget {key:?} are invalid: {source}")]
    InvalidOptions {
        /// Widget key.
        key: String,
        /// Why the options were rejected.
        source: CodecError,
    },

    /// A widget asked for a codec tag nobody registered.
    #[error("widget {key:?} uses unregistered codec {tag:?}")]
    UnknownCodec {
        /// Widget key.
        key: String,
        /// Requested tag.
        tag: String,
    },

    /// A value of the wrong family reached a widget.
    #[error("widget {key:?} holds a {found} value, expected {expected}")]
    WrongValueType {
        /// Widget key.
        key: String,
        /// Family the codec produces.
        expected: ValueKind,
        /// Family actually found.
        found: ValueKind,
    },

    /// A key selection pattern is not a valid regular expression.
    #[error("invalid key pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The pattern text.
        pattern: String,
        /// Parser message.
        reason: String,
    },
}

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Invalid widget setup.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A live value could not be written to the query string.
    #[error("cannot encode value of widget {key:?}: {source}")]
    Encode {
        /// Widget key.
        key: String,
        /// Codec failure.
        source: CodecError,
    },

    /// The query-parameter store failed.
    #[error("query store error: {0}")]
    Store(#[from] StoreError),

    /// The host framework failed to render or dispatch.
    #[error("host error: {0}")]
    Host(String),
}

impl SyncError {
    /// Creates a host error.
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }

    /// Returns true if this error is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SyncError::Configuration(_))
    }
}
