//! # formlink Codec
//!
//! Conversions between native widget values and their URL query-string
//! representation.
//!
//! This crate provides:
//! - [`Value`], the closed set of native widget value families
//! - [`QueryValue`], a single or repeated raw query parameter
//! - [`Codec`], one variant per value family with encode, decode and
//!   default-equality rules
//! - [`CodecRegistry`], codecs addressed by tag
//!
//! ## Encoding Rules
//!
//! - Text is the identity; `""` is a value, absence is not
//! - Booleans emit `true` / `false` and accept any case on decode
//! - Numbers are base-10; floats use the shortest round-trip form
//! - Dates and times use a fixed ISO-8601 subset
//! - Multi-choice values repeat the key, one entry per element, in
//!   selection order; the empty selection is a single empty entry
//!
//! ## Usage
//!
//! ```
//! use formlink_codec::{Codec, QueryValue, Value};
//!
//! let raw = Codec::Bool.encode(&Value::Bool(true)).unwrap();
//! assert_eq!(raw, QueryValue::from("true"));
//! assert_eq!(Codec::Bool.decode(&QueryValue::from("TRUE")).unwrap(), Value::Bool(true));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod error;
mod query;
mod registry;
mod value;

pub use codec::{Choices, Codec, CustomCodec, DecodeFn, EncodeFn, InvalidElements};
pub use error::{CodecError, CodecResult};
pub use query::QueryValue;
pub use registry::CodecRegistry;
pub use value::{Value, ValueKind};

/// Re-exported so callers can build date and time values without a
/// direct chrono dependency.
pub use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
