//! Query-parameter store trait definition.

use crate::error::StoreResult;
use formlink_codec::QueryValue;

/// The current page's URL query parameters.
///
/// This is the boundary to the host framework, which owns the real query
/// map. All operations act on the snapshot of the current render pass and
/// take effect immediately within it; the host decides when changes reach
/// the browser's address bar (normally once the pass has finished). An
/// adapter must not buffer writes across passes.
///
/// # Invariants
///
/// - Keys are unique; a key maps to one or more values
/// - `get_all` returns values in query-string order
/// - `set_all` with no values is the same as `delete`
/// - `delete` on an absent key is a no-op
///
/// # Implementors
///
/// - [`super::InMemoryParamStore`] - For tests and tools
pub trait ParamStore {
    /// Returns the last value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be read.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Returns every value stored under `key`, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be read.
    fn get_all(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Replaces the values of `key` with a single value.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the write.
    fn set(&mut self, key: &str, value: String) -> StoreResult<()>;

    /// Replaces the values of `key` with `values`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the write.
    fn set_all(&mut self, key: &str, values: Vec<String>) -> StoreResult<()>;

    /// Removes `key`. Returns true if it was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the write.
    fn delete(&mut self, key: &str) -> StoreResult<bool>;

    /// Returns all keys, in query-string order.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be read.
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Returns the raw representation stored under `key`.
    fn get_query(&self, key: &str) -> StoreResult<Option<QueryValue>> {
        Ok(QueryValue::from_values(self.get_all(key)?))
    }

    /// Stores a raw representation under `key`.
    fn put_query(&mut self, key: &str, value: QueryValue) -> StoreResult<()> {
        match value {
            QueryValue::Single(value) => self.set(key, value),
            QueryValue::Multi(values) => self.set_all(key, values),
        }
    }

    /// Returns true if `key` has at least one value.
    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(!self.get_all(key)?.is_empty())
    }
}
