//! Session-scoped widget value store.

use formlink_codec::Value;

/// Per-session widget state owned by the host.
///
/// Holds the live native value of each widget key, plus a flag recording
/// whether the key has already been initialized from the URL in this
/// session. The flag is tracked separately from the value so that a live
/// value which happens to equal the URL value is never mistaken for a
/// fresh one.
pub trait SessionStore {
    /// Returns the live value of `key`.
    fn value(&self, key: &str) -> Option<Value>;

    /// Sets the live value of `key`.
    fn set_value(&mut self, key: &str, value: Value);

    /// Removes the live value of `key`, returning it.
    ///
    /// The initialized flag is left untouched.
    fn remove(&mut self, key: &str) -> Option<Value>;

    /// Returns true if `key` has already been initialized this session.
    fn is_initialized(&self, key: &str) -> bool;

    /// Records that `key` has been initialized.
    fn mark_initialized(&mut self, key: &str);

    /// Keys that currently hold a value, sorted.
    fn keys(&self) -> Vec<String>;

    /// Returns true if `key` holds a value.
    fn contains(&self, key: &str) -> bool {
        self.value(key).is_some()
    }
}
