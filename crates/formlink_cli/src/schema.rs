//! Form schema files.
//!
//! A schema describes the widgets of a page in JSON so query strings can
//! be resolved and normalized without running the page:
//!
//! ```json
//! {
//!   "config": { "excluded_keys": ["token"] },
//!   "fields": [
//!     { "key": "name", "codec": "text", "default": "" },
//!     { "key": "tags", "codec": "multi_choice", "options": ["a", "b", "c"], "default": [] }
//!   ]
//! }
//! ```
//!
//! Options and defaults are written in their query-string form and decoded
//! with the field's codec.

use crate::error::{CliError, CliResult};
use formlink_codec::{Codec, CodecError, CodecRegistry, InvalidElements, QueryValue, Value};
use formlink_sync::{Binding, BindingSet, ConfigurationError, SyncConfig};
use serde::Deserialize;
use std::path::Path;

/// A page of widgets.
#[derive(Debug, Clone, Deserialize)]
pub struct Schema {
    /// Engine configuration.
    #[serde(default)]
    pub config: SyncConfig,
    /// Widgets in render order.
    pub fields: Vec<FieldSpec>,
}

/// One widget.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    /// Widget key.
    pub key: String,
    /// Codec tag: a registered tag, `choice` or `multi_choice`.
    pub codec: String,
    /// Choice options in query-string form.
    #[serde(default)]
    pub options: Vec<String>,
    /// Codec tag the options are decoded with; `text` if absent.
    #[serde(default)]
    pub option_codec: Option<String>,
    /// Default in query-string form; a list for multi-choice fields.
    #[serde(default)]
    pub default: Option<RawDefault>,
    /// Query key, if it differs from the widget key.
    #[serde(default)]
    pub param_key: Option<String>,
    /// Unknown-element handling for multi-choice fields.
    #[serde(default)]
    pub invalid_elements: Option<InvalidElements>,
}

/// A default value in query-string form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDefault {
    /// A single query value.
    Single(String),
    /// One query value per selected element.
    List(Vec<String>),
}

impl RawDefault {
    fn to_query(&self) -> QueryValue {
        match self {
            RawDefault::Single(value) => QueryValue::Single(value.clone()),
            // The empty selection is spelled as a single empty value.
            RawDefault::List(values) => QueryValue::from_values(values.clone())
                .unwrap_or_else(|| QueryValue::Single(String::new())),
        }
    }
}

impl Schema {
    /// Reads a schema file.
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses a schema from JSON text.
    pub fn parse(text: &str) -> CliResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds and cross-checks the bindings of every field.
    ///
    /// # Errors
    ///
    /// Fails on the first field with a missing or invalid default, unusable
    /// options, an unknown codec or a conflicting query key.
    pub fn bindings(&self, registry: &CodecRegistry) -> CliResult<BindingSet> {
        let mut set = BindingSet::new();
        for field in &self.fields {
            let binding = field.binding(registry, &self.config)?;
            set.insert(binding)?;
        }
        Ok(set)
    }
}

impl FieldSpec {
    /// Builds the binding for this field.
    pub fn binding(&self, registry: &CodecRegistry, config: &SyncConfig) -> CliResult<Binding> {
        let codec = self.codec(registry, config)?;
        let default = match &self.default {
            Some(raw) => Some(codec.strict().decode(&raw.to_query()).map_err(|source| {
                ConfigurationError::InvalidDefault {
                    key: self.key.clone(),
                    source,
                }
            })?),
            None => None,
        };
        let mut binding = Binding::new(&self.key, codec, default)?;
        if let Some(param_key) = &self.param_key {
            binding = binding.with_param_key(param_key);
        }
        Ok(binding)
    }

    fn codec(&self, registry: &CodecRegistry, config: &SyncConfig) -> CliResult<Codec> {
        let invalid_options = |source: CodecError| ConfigurationError::InvalidOptions {
            key: self.key.clone(),
            source,
        };
        match self.codec.as_str() {
            "choice" => Ok(Codec::choice(self.option_values(registry)?).map_err(invalid_options)?),
            "multi_choice" => {
                let invalid = self.invalid_elements.unwrap_or(config.invalid_elements);
                Ok(Codec::multi_choice(self.option_values(registry)?, invalid)
                    .map_err(invalid_options)?)
            }
            tag => registry.get(tag).cloned().ok_or_else(|| {
                ConfigurationError::UnknownCodec {
                    key: self.key.clone(),
                    tag: tag.to_string(),
                }
                .into()
            }),
        }
    }

    fn option_values(&self, registry: &CodecRegistry) -> CliResult<Vec<Value>> {
        let tag = self.option_codec.as_deref().unwrap_or("text");
        let Some(codec) = registry.get(tag) else {
            return Err(ConfigurationError::UnknownCodec {
                key: self.key.clone(),
                tag: tag.to_string(),
            }
            .into());
        };
        self.options
            .iter()
            .map(|raw| {
                codec
                    .decode(&QueryValue::from(raw.as_str()))
                    .map_err(|source| {
                        CliError::from(ConfigurationError::InvalidOptions {
                            key: self.key.clone(),
                            source,
                        })
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formlink_sync::SyncError;
    use std::io::Write;

    const PAGE: &str = r#"{
        "config": { "excluded_keys": ["token"] },
        "fields": [
            { "key": "name", "codec": "text", "default": "" },
            { "key": "subscribe", "codec": "bool", "default": "false" },
            { "key": "size", "codec": "choice", "options": ["1", "2", "3"],
              "option_codec": "integer", "default": "2", "param_key": "s" },
            { "key": "tags", "codec": "multi_choice", "options": ["a", "b", "c"], "default": [] }
        ]
    }"#;

    #[test]
    fn parses_and_builds_bindings() {
        let schema = Schema::parse(PAGE).unwrap();
        assert!(schema.config.is_excluded("token"));
        let bindings = schema.bindings(&CodecRegistry::new()).unwrap();
        assert_eq!(bindings.len(), 4);

        let size = bindings.get("size").unwrap();
        assert_eq!(size.param_key(), "s");
        assert_eq!(size.default_value(), &Value::Integer(2));
        assert_eq!(
            bindings.get("tags").unwrap().default_value(),
            &Value::List(vec![])
        );
        assert_eq!(
            bindings.get("subscribe").unwrap().default_value(),
            &Value::Bool(false)
        );
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PAGE.as_bytes()).unwrap();
        let schema = Schema::load(file.path()).unwrap();
        assert_eq!(schema.fields.len(), 4);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Schema::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn missing_default_is_reported() {
        let schema = Schema::parse(r#"{"fields":[{"key":"n","codec":"integer"}]}"#).unwrap();
        let err = schema.bindings(&CodecRegistry::new()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Sync(SyncError::Configuration(ConfigurationError::MissingDefault { .. }))
        ));
    }

    #[test]
    fn bad_default_and_options_are_reported() {
        let schema =
            Schema::parse(r#"{"fields":[{"key":"n","codec":"integer","default":"x"}]}"#).unwrap();
        assert!(matches!(
            schema.bindings(&CodecRegistry::new()),
            Err(CliError::Sync(SyncError::Configuration(
                ConfigurationError::InvalidDefault { .. }
            )))
        ));

        let schema = Schema::parse(
            r#"{"fields":[{"key":"c","codec":"choice","options":["x"],"option_codec":"integer","default":"1"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            schema.bindings(&CodecRegistry::new()),
            Err(CliError::Sync(SyncError::Configuration(
                ConfigurationError::InvalidOptions { .. }
            )))
        ));
    }

    #[test]
    fn unknown_default_element_is_reported() {
        let schema = Schema::parse(
            r#"{"fields":[{"key":"tags","codec":"multi_choice","options":["a","b"],
                "invalid_elements":"discard","default":["a","zzz"]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            schema.bindings(&CodecRegistry::new()),
            Err(CliError::Sync(SyncError::Configuration(
                ConfigurationError::InvalidDefault { .. }
            )))
        ));
    }

    #[test]
    fn unknown_codec_is_reported() {
        let schema =
            Schema::parse(r#"{"fields":[{"key":"n","codec":"color","default":"red"}]}"#).unwrap();
        assert!(matches!(
            schema.bindings(&CodecRegistry::new()),
            Err(CliError::Sync(SyncError::Configuration(
                ConfigurationError::UnknownCodec { .. }
            )))
        ));
    }

    #[test]
    fn collisions_are_reported() {
        let schema = Schema::parse(
            r#"{"fields":[
                {"key":"a","codec":"integer","default":"0","param_key":"n"},
                {"key":"b","codec":"text","default":"","param_key":"n"}
            ]}"#,
        )
        .unwrap();
        assert!(matches!(
            schema.bindings(&CodecRegistry::new()),
            Err(CliError::Sync(SyncError::Configuration(
                ConfigurationError::IncompatibleCodec { .. }
            )))
        ));
    }
}
