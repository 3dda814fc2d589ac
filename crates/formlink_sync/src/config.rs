//! Configuration for the sync engine.

use crate::policy::DefaultPolicy;
use formlink_codec::InvalidElements;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Configuration for query-string synchronization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// When a value is left out of the query string.
    pub default_policy: DefaultPolicy,
    /// Whether new widgets write their value back to the query string.
    pub autoupdate: bool,
    /// How new multi-choice widgets treat unknown elements in the URL.
    pub invalid_elements: InvalidElements,
    /// Query keys that are never written or listed in permalinks.
    pub excluded_keys: BTreeSet<String>,
    /// Whether malformed query values are logged as warnings.
    pub warn_on_decode_failure: bool,
}

impl SyncConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            default_policy: DefaultPolicy::OmitDefaults,
            autoupdate: true,
            invalid_elements: InvalidElements::Discard,
            excluded_keys: BTreeSet::new(),
            warn_on_decode_failure: true,
        }
    }

    /// Sets the default policy.
    pub fn with_default_policy(mut self, policy: DefaultPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Sets whether widgets write back by default.
    pub fn with_autoupdate(mut self, autoupdate: bool) -> Self {
        self.autoupdate = autoupdate;
        self
    }

    /// Sets the multi-choice handling of unknown elements.
    pub fn with_invalid_elements(mut self, invalid: InvalidElements) -> Self {
        self.invalid_elements = invalid;
        self
    }

    /// Sets whether decode failures are logged.
    pub fn with_decode_warnings(mut self, warn: bool) -> Self {
        self.warn_on_decode_failure = warn;
        self
    }

    /// Excludes a query key from all writes and permalinks.
    pub fn exclude_key(mut self, key: impl Into<String>) -> Self {
        self.excluded_keys.insert(key.into());
        self
    }

    /// Removes a key from the exclusion list. Unknown keys are ignored.
    pub fn include_key(mut self, key: &str) -> Self {
        self.excluded_keys.remove(key);
        self
    }

    /// Returns true if `key` must never be written.
    pub fn is_excluded(&self, key: &str) -> bool {
        self.excluded_keys.contains(key)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
