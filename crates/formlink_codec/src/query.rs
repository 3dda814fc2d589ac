//! Raw query-string representation of a parameter.

/// The raw value(s) a query parameter carries.
///
/// A key repeated in the query string (`tags=a&tags=c`) is a
/// [`QueryValue::Multi`]; order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Exactly one value.
    Single(String),
    /// Any number of values, in query-string order.
    Multi(Vec<String>),
}

impl QueryValue {
    /// Builds a representation from the values stored under a key.
    ///
    /// Returns `None` when there are no values, since absence is
    /// distinct from an empty string.
    pub fn from_values(mut values: Vec<String>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(QueryValue::Single),
            _ => Some(QueryValue::Multi(values)),
        }
    }

    /// Returns all raw values in order.
    pub fn values(&self) -> &[String] {
        match self {
            QueryValue::Single(s) => std::slice::from_ref(s),
            QueryValue::Multi(values) => values,
        }
    }

    /// Consumes the representation and returns its raw values.
    pub fn into_values(self) -> Vec<String> {
        match self {
            QueryValue::Single(s) => vec![s],
            QueryValue::Multi(values) => values,
        }
    }

    /// Returns the value if exactly one is present.
    pub fn as_single(&self) -> Option<&str> {
        match self.values() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Number of raw values.
    pub fn len(&self) -> usize {
        self.values().len()
    }

    /// Returns true if the representation carries no values.
    ///
    /// Only an empty [`QueryValue::Multi`] can be empty.
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Single(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Single(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values_distinguishes_absence() {
        assert_eq!(QueryValue::from_values(vec![]), None);
        assert_eq!(
            QueryValue::from_values(vec![String::new()]),
            Some(QueryValue::Single(String::new()))
        );
        assert_eq!(
            QueryValue::from_values(vec!["a".into(), "c".into()]),
            Some(QueryValue::Multi(vec!["a".into(), "c".into()]))
        );
    }

    #[test]
    fn single_access() {
        assert_eq!(QueryValue::from("x").as_single(), Some("x"));
        assert_eq!(QueryValue::Multi(vec!["x".into()]).as_single(), Some("x"));
        assert_eq!(
            QueryValue::Multi(vec!["x".into(), "y".into()]).as_single(),
            None
        );
        assert!(QueryValue::Multi(vec![]).is_empty());
    }
}
