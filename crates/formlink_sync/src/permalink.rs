//! Permalink helpers: building and rewriting query strings from a form.

use crate::binding::{Binding, BindingSet};
use crate::engine::SyncEngine;
use crate::error::{ConfigurationError, SyncError, SyncResult};
use crate::form::Form;
use crate::host::{ChangeCallback, ChangeContext, HostStores, WidgetHost};
use crate::policy::Decision;
use formlink_codec::Value;
use formlink_store::{format_query, ParamStore, SessionStore};
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Which query keys a permalink operation applies to.
///
/// Patterns are regular expressions that must match at the start of the
/// key. Keys excluded in the engine configuration are never selected.
#[derive(Debug, Clone)]
pub struct KeySelection {
    all: bool,
    keys: Vec<String>,
    patterns: Vec<Regex>,
}

impl KeySelection {
    /// Selects every key.
    pub fn all() -> Self {
        Self {
            all: true,
            keys: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Selects exactly `keys`. An empty list selects nothing.
    pub fn keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            all: false,
            keys: keys.into_iter().map(Into::into).collect(),
            patterns: Vec::new(),
        }
    }

    /// Selects keys starting with a match of `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidPattern`] if `pattern` does not
    /// compile.
    pub fn pattern(pattern: &str) -> SyncResult<Self> {
        Self::keys(Vec::<String>::new()).with_pattern(pattern)
    }

    /// Also selects `key`.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    /// Also selects keys starting with a match of `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidPattern`] if `pattern` does not
    /// compile.
    pub fn with_pattern(self, pattern: &str) -> SyncResult<Self> {
        let regex = Regex::new(pattern).map_err(|err| ConfigurationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })?;
        Ok(self.with_regex(regex))
    }

    /// Also selects keys starting with a match of `regex`.
    pub fn with_regex(mut self, regex: Regex) -> Self {
        self.patterns.push(regex);
        self
    }

    /// Returns true if every key is selected.
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// Returns true if `key` is selected, before exclusions.
    pub fn matches(&self, key: &str) -> bool {
        self.all
            || self.keys.iter().any(|k| k == key)
            || self
                .patterns
                .iter()
                .any(|re| re.find(key).is_some_and(|m| m.start() == 0))
    }
}

impl Default for KeySelection {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Push,
    Add,
}

/// Bindings selected by `selection`, one per query key, first bound wins.
fn selected<'b>(
    engine: &SyncEngine,
    bindings: &'b BindingSet,
    selection: &KeySelection,
) -> Vec<&'b Binding> {
    let mut seen = HashSet::new();
    bindings
        .iter()
        .filter(|b| selection.matches(b.param_key()) && !engine.config().is_excluded(b.param_key()))
        .filter(|b| seen.insert(b.param_key().to_string()))
        .collect()
}

fn current_value<S: SessionStore + ?Sized>(binding: &Binding, session: &S) -> Value {
    session
        .value(binding.widget_key())
        .unwrap_or_else(|| binding.default_value().clone())
}

fn write_selected<P, S>(
    engine: &SyncEngine,
    bindings: &BindingSet,
    selection: &KeySelection,
    mode: Mode,
    params: &mut P,
    session: &S,
) -> SyncResult<()>
where
    P: ParamStore + ?Sized,
    S: SessionStore + ?Sized,
{
    for binding in selected(engine, bindings, selection) {
        let value = current_value(binding, session);
        match mode {
            Mode::Push => engine.write(binding, &value, params)?,
            Mode::Add => engine.add(binding, &value, params)?,
        };
    }
    Ok(())
}

fn clear_selected<P: ParamStore + ?Sized>(
    engine: &SyncEngine,
    selection: &KeySelection,
    params: &mut P,
) -> SyncResult<()> {
    for key in params.keys()? {
        if selection.matches(&key) && !engine.config().is_excluded(&key) {
            params.delete(&key)?;
        }
    }
    Ok(())
}

impl<H: WidgetHost + ?Sized> Form<'_, H> {
    /// Builds a relative URL (`?k=v&...`) reproducing the selected widgets.
    ///
    /// Only widgets shown earlier in this pass are known. Defaults are
    /// left out according to the default policy.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Encode`] if a live value cannot be
    /// encoded.
    pub fn permalink(&mut self, selection: &KeySelection) -> SyncResult<String> {
        let HostStores { session, .. } = self.host.stores();
        let mut pairs = Vec::new();
        for binding in selected(&self.engine, &self.bindings, selection) {
            let value = current_value(binding, &*session);
            let decision = self.engine.config().default_policy.decide(
                binding.codec(),
                &value,
                binding.default_value(),
            );
            if decision == Decision::Omit {
                continue;
            }
            let encoded = binding
                .codec()
                .encode(&value)
                .map_err(|source| SyncError::Encode {
                    key: binding.widget_key().to_string(),
                    source,
                })?;
            for raw in encoded.into_values() {
                pairs.push((binding.param_key().to_string(), raw));
            }
        }
        let query = format_query(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Ok(format!("?{query}"))
    }

    /// Writes the selected widgets to the query string, deleting defaults.
    pub fn push_params(&mut self, selection: &KeySelection) -> SyncResult<()> {
        let HostStores { params, session } = self.host.stores();
        write_selected(&self.engine, &self.bindings, selection, Mode::Push, params, &*session)
    }

    /// Writes the selected non-default widgets; never deletes a key.
    pub fn add_params(&mut self, selection: &KeySelection) -> SyncResult<()> {
        let HostStores { params, session } = self.host.stores();
        write_selected(&self.engine, &self.bindings, selection, Mode::Add, params, &*session)
    }

    /// Deletes the selected keys from the query string.
    ///
    /// Unlike the other helpers this looks at the keys present in the
    /// store, so keys no widget owns can be cleared too.
    pub fn clear_params(&mut self, selection: &KeySelection) -> SyncResult<()> {
        let HostStores { params, .. } = self.host.stores();
        clear_selected(&self.engine, selection, params)?;
        debug!("cleared query parameters");
        Ok(())
    }

    /// Clears every key, then writes the selected widgets.
    pub fn replace_params(&mut self, selection: &KeySelection) -> SyncResult<()> {
        self.clear_params(&KeySelection::all())?;
        self.push_params(selection)
    }

    /// A change handler that runs [`Form::push_params`] on each edit.
    ///
    /// It covers the widgets shown before this call.
    pub fn push_callback(&self, selection: KeySelection) -> ChangeCallback {
        self.write_callback(selection, Mode::Push)
    }

    /// A change handler that runs [`Form::add_params`] on each edit.
    pub fn add_callback(&self, selection: KeySelection) -> ChangeCallback {
        self.write_callback(selection, Mode::Add)
    }

    /// A change handler that runs [`Form::clear_params`] on each edit.
    pub fn clear_callback(&self, selection: KeySelection) -> ChangeCallback {
        let engine = self.engine.clone();
        Box::new(move |ctx: &mut ChangeContext<'_>| clear_selected(&engine, &selection, &mut *ctx.params))
    }

    fn write_callback(&self, selection: KeySelection, mode: Mode) -> ChangeCallback {
        let engine = self.engine.clone();
        let bindings = self.bindings.clone();
        Box::new(move |ctx: &mut ChangeContext<'_>| {
            write_selected(&engine, &bindings, &selection, mode, &mut *ctx.params, &*ctx.session)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_keys() {
        let selection = KeySelection::keys(["a", "b"]);
        assert!(selection.matches("a"));
        assert!(!selection.matches("ab"));
        assert!(!selection.is_all());
        assert!(!KeySelection::keys(Vec::<String>::new()).matches("a"));
    }

    #[test]
    fn patterns_match_at_start() {
        let selection = KeySelection::pattern("filter_").unwrap();
        assert!(selection.matches("filter_color"));
        assert!(!selection.matches("my_filter_color"));

        let selection = KeySelection::pattern("a|b").unwrap().with_key("zz");
        assert!(selection.matches("bx"));
        assert!(selection.matches("zz"));
        assert!(!selection.matches("xa"));
    }

    #[test]
    fn invalid_pattern() {
        let err = KeySelection::pattern("(").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn all_matches_everything() {
        assert!(KeySelection::all().matches("anything"));
        assert!(KeySelection::default().is_all());
    }
}
