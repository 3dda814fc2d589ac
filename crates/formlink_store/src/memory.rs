//! In-memory stores for testing and tooling.

use crate::error::{StoreError, StoreResult};
use crate::params::ParamStore;
use crate::query_string::{format_query, parse_query};
use crate::session::SessionStore;
use formlink_codec::Value;
use std::collections::{BTreeMap, HashSet};

/// An in-memory query-parameter map.
///
/// Keys keep the order in which they first appeared, so serializing back to
/// a query string is stable.
///
/// # Example
///
/// ```rust
/// use formlink_store::{InMemoryParamStore, ParamStore};
///
/// let mut params = InMemoryParamStore::from_query_string("?name=Hello+World");
/// assert_eq!(params.get("name").unwrap().as_deref(), Some("Hello World"));
/// params.set("subscribe", "true".into()).unwrap();
/// assert_eq!(params.to_query_string(), "name=Hello+World&subscribe=true");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryParamStore {
    entries: Vec<(String, Vec<String>)>,
    read_only: bool,
}

impl InMemoryParamStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from a query string such as `?a=1&b=2&b=3`.
    #[must_use]
    pub fn from_query_string(query: &str) -> Self {
        Self::from_pairs(parse_query(query))
    }

    /// Creates a store from ordered key/value pairs; repeated keys collect.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, Vec<String>)> = Vec::new();
        for (key, value) in pairs {
            let key = key.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, values)) => values.push(value.into()),
                None => entries.push((key, vec![value.into()])),
            }
        }
        Self {
            entries,
            read_only: false,
        }
    }

    /// Serializes the store without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        format_query(
            self.entries
                .iter()
                .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str()))),
        )
    }

    /// Returns a copy of every key with its values.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, Vec<String>)> {
        self.entries.clone()
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Makes every subsequent write fail with [`StoreError::ReadOnly`].
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn check_writable(&self, key: &str) -> StoreResult<()> {
        if self.read_only {
            Err(StoreError::ReadOnly {
                key: key.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl ParamStore for InMemoryParamStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, values)| values.last().cloned()))
    }

    fn get_all(&self, key: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.clone())
            .unwrap_or_default())
    }

    fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
        self.set_all(key, vec![value])
    }

    fn set_all(&mut self, key: &str, values: Vec<String>) -> StoreResult<()> {
        self.check_writable(key)?;
        if values.is_empty() {
            self.entries.retain(|(k, _)| k != key);
            return Ok(());
        }
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((key.to_string(), values)),
        }
        Ok(())
    }

    fn delete(&mut self, key: &str) -> StoreResult<bool> {
        self.check_writable(key)?;
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        Ok(self.entries.len() != before)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.entries.iter().map(|(k, _)| k.clone()).collect())
    }
}

/// An in-memory session store.
///
/// One instance corresponds to one user session; dropping it and creating
/// a new one simulates a fresh visit.
#[derive(Debug, Clone, Default)]
pub struct InMemorySession {
    values: BTreeMap<String, Value>,
    initialized: HashSet<String>,
}

impl InMemorySession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with pre-existing widget values.
    ///
    /// The keys are not marked initialized.
    #[must_use]
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            initialized: HashSet::new(),
        }
    }
}

impl SessionStore for InMemorySession {
    fn value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    fn is_initialized(&self, key: &str) -> bool {
        self.initialized.contains(key)
    }

    fn mark_initialized(&mut self, key: &str) {
        self.initialized.insert(key.to_string());
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}
