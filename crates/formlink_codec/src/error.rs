//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding query values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A raw query value could not be turned into a native value.
    #[error("cannot decode {raw:?} as {expected}: {reason}")]
    Decode {
        /// The offending raw text.
        raw: String,
        /// Name of the codec family that was expected.
        expected: String,
        /// Why decoding failed.
        reason: String,
    },

    /// The query parameter carries no value at all.
    #[error("no value present for {expected}")]
    Missing {
        /// Name of the codec family that was expected.
        expected: String,
    },

    /// A single-valued codec received several values.
    #[error("expected one value for {expected}, got {count}")]
    MultipleValues {
        /// Name of the codec family that was expected.
        expected: String,
        /// Number of values received.
        count: usize,
    },

    /// A native value lies outside the codec's domain.
    #[error("cannot encode {value} as {expected}: {reason}")]
    Encode {
        /// Debug rendering of the value.
        value: String,
        /// Name of the codec family.
        expected: String,
        /// Why encoding failed.
        reason: String,
    },

    /// A choice codec was configured with unusable options.
    #[error("invalid choice options: {reason}")]
    InvalidOptions {
        /// Why the options were rejected.
        reason: String,
    },

    /// No codec is registered under the given tag.
    #[error("unknown codec tag: {tag}")]
    UnknownTag {
        /// The requested tag.
        tag: String,
    },
}

impl CodecError {
    /// Create a decode error.
    pub fn decode(
        raw: impl Into<String>,
        expected: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Decode {
            raw: raw.into(),
            expected: expected.into(),
            reason: reason.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(
        value: impl std::fmt::Debug,
        expected: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Encode {
            value: format!("{value:?}"),
            expected: expected.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid options error.
    pub fn invalid_options(reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            reason: reason.into(),
        }
    }

    /// Create an unknown tag error.
    pub fn unknown_tag(tag: impl Into<String>) -> Self {
        Self::UnknownTag { tag: tag.into() }
    }

    /// Returns true if this error came from reading untrusted input.
    ///
    /// Read-side failures are recoverable (fall back to the default);
    /// everything else indicates a programming error.
    pub fn is_decode_side(&self) -> bool {
        matches!(
            self,
            CodecError::Decode { .. } | CodecError::Missing { .. } | CodecError::MultipleValues { .. }
        )
    }
}
