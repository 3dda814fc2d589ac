//! Named codec registry.

use crate::codec::{Codec, CustomCodec};
use crate::error::{CodecError, CodecResult};
use crate::query::QueryValue;
use crate::value::{Value, ValueKind};
use std::collections::HashMap;

/// Maps codec tags to codecs.
///
/// A new registry already contains the scalar families under their
/// [`ValueKind::name`]: `text`, `bool`, `integer`, `float`, `date`,
/// `time` and `datetime`.
///
/// # Example
///
/// ```
/// use formlink_codec::{CodecRegistry, QueryValue, Value};
///
/// let registry = CodecRegistry::new();
/// let raw = registry.encode("integer", &Value::Integer(42)).unwrap();
/// assert_eq!(raw, QueryValue::from("42"));
/// assert_eq!(registry.decode("integer", &raw).unwrap(), Value::Integer(42));
/// ```
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: HashMap<String, Codec>,
}

impl CodecRegistry {
    /// Creates a registry holding the builtin scalar codecs.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for codec in [
            Codec::Text,
            Codec::Bool,
            Codec::Integer,
            Codec::Float,
            Codec::Date,
            Codec::Time,
            Codec::DateTime,
        ] {
            registry.register(codec.name().to_string(), codec);
        }
        registry
    }

    /// Creates a registry with no codecs at all.
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Registers `codec` under `tag`, returning the codec it replaced.
    pub fn register(&mut self, tag: impl Into<String>, codec: Codec) -> Option<Codec> {
        self.codecs.insert(tag.into(), codec)
    }

    /// Registers a single-valued codec built from two functions.
    pub fn register_fn<E, D>(
        &mut self,
        tag: impl Into<String>,
        kind: ValueKind,
        encode: E,
        decode: D,
    ) -> Option<Codec>
    where
        E: Fn(&Value) -> CodecResult<String> + Send + Sync + 'static,
        D: Fn(&str) -> CodecResult<Value> + Send + Sync + 'static,
    {
        let tag = tag.into();
        let codec = Codec::Custom(CustomCodec::new(tag.clone(), kind, encode, decode));
        self.register(tag, codec)
    }

    /// Looks up a codec.
    pub fn get(&self, tag: &str) -> Option<&Codec> {
        self.codecs.get(tag)
    }

    /// Looks up a codec, failing on unknown tags.
    pub fn require(&self, tag: &str) -> CodecResult<&Codec> {
        self.get(tag).ok_or_else(|| CodecError::unknown_tag(tag))
    }

    /// Returns true if `tag` is registered.
    pub fn contains(&self, tag: &str) -> bool {
        self.codecs.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Encodes `value` with the codec registered under `tag`.
    pub fn encode(&self, tag: &str, value: &Value) -> CodecResult<QueryValue> {
        self.require(tag)?.encode(value)
    }

    /// Decodes `raw` with the codec registered under `tag`.
    pub fn decode(&self, tag: &str, raw: &QueryValue) -> CodecResult<Value> {
        self.require(tag)?.decode(raw)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}
