//! Widget-to-query-key bindings.

use crate::error::{ConfigurationError, SyncResult};
use formlink_codec::{Codec, Value};

/// Associates one widget with one query key, codec and default.
///
/// A binding is re-derived from the widget call on every render pass; the
/// value it governs lives in the host's session store.
#[derive(Debug, Clone)]
pub struct Binding {
    widget_key: String,
    param_key: String,
    codec: Codec,
    default: Value,
    autoupdate: bool,
}

impl Binding {
    /// Creates a binding whose query key equals the widget key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingDefault`] when `default` is
    /// `None` and [`ConfigurationError::InvalidDefault`] when the codec
    /// cannot encode it.
    pub fn new(
        widget_key: impl Into<String>,
        codec: Codec,
        default: Option<Value>,
    ) -> SyncResult<Self> {
        let widget_key = widget_key.into();
        let Some(default) = default else {
            return Err(ConfigurationError::MissingDefault { key: widget_key }.into());
        };
        if let Err(source) = codec.encode(&default) {
            return Err(ConfigurationError::InvalidDefault {
                key: widget_key,
                source,
            }
            .into());
        }
        Ok(Self {
            param_key: widget_key.clone(),
            widget_key,
            codec,
            default,
            autoupdate: true,
        })
    }

    /// Remaps the query key.
    pub fn with_param_key(mut self, param_key: impl Into<String>) -> Self {
        self.param_key = param_key.into();
        self
    }

    /// Sets whether the live value is written back to the query string.
    pub fn with_autoupdate(mut self, autoupdate: bool) -> Self {
        self.autoupdate = autoupdate;
        self
    }

    /// The widget key, unique within a page.
    pub fn widget_key(&self) -> &str {
        &self.widget_key
    }

    /// The query key this binding owns.
    pub fn param_key(&self) -> &str {
        &self.param_key
    }

    /// The codec.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// The default value.
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Whether the live value is written back.
    pub fn autoupdate(&self) -> bool {
        self.autoupdate
    }

    /// Fails unless `value` has the family the codec produces.
    pub fn check_value(&self, value: &Value) -> SyncResult<()> {
        let expected = self.codec.value_kind();
        if value.kind() == expected {
            Ok(())
        } else {
            Err(ConfigurationError::WrongValueType {
                key: self.widget_key.clone(),
                expected,
                found: value.kind(),
            }
            .into())
        }
    }
}

/// The bindings seen during one render pass.
///
/// Rejects a second binding for the same widget key, and a second binding
/// for the same query key whose codec reads or writes it differently or
/// whose default differs.
#[derive(Debug, Clone, Default)]
pub struct BindingSet {
    bindings: Vec<Binding>,
}

impl BindingSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that `binding` can join the set without conflicts.
    pub fn check(&self, binding: &Binding) -> SyncResult<()> {
        for existing in &self.bindings {
            if existing.widget_key == binding.widget_key {
                return Err(ConfigurationError::DuplicateKey {
                    key: binding.widget_key.clone(),
                }
                .into());
            }
            if existing.param_key == binding.param_key
                && !existing.codec.is_compatible(&binding.codec)
            {
                return Err(ConfigurationError::IncompatibleCodec {
                    param_key: binding.param_key.clone(),
                    first: existing.widget_key.clone(),
                    first_codec: existing.codec.name().to_string(),
                    second: binding.widget_key.clone(),
                    second_codec: binding.codec.name().to_string(),
                }
                .into());
            }
            if existing.param_key == binding.param_key
                && !existing
                    .codec
                    .values_equal(&existing.default, &binding.default)
            {
                return Err(ConfigurationError::ConflictingDefaults {
                    param_key: binding.param_key.clone(),
                    first: existing.widget_key.clone(),
                    second: binding.widget_key.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// The first binding on `param_key`, which owns writes to that key.
    pub fn owner(&self, param_key: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.param_key == param_key)
    }

    /// Adds `binding` after checking it.
    pub fn insert(&mut self, binding: Binding) -> SyncResult<()> {
        self.check(&binding)?;
        self.bindings.push(binding);
        Ok(())
    }

    /// Looks up a binding by widget key.
    pub fn get(&self, widget_key: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.widget_key == widget_key)
    }

    /// Bindings in the order they were added.
    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.bindings.iter()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no binding was added.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'a> IntoIterator for &'a BindingSet {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
