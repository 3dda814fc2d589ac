//! Conversion between Rust types and widget values.

use formlink_codec::{NaiveDate, NaiveDateTime, NaiveTime, Value};

/// A Rust type a widget can hold.
pub trait NativeValue: Sized {
    /// Wraps `self` as a widget value.
    fn into_value(self) -> Value;

    /// Unwraps a widget value of the matching family.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_native {
    ($ty:ty, $variant:ident) => {
        impl NativeValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_native!(String, Text);
impl_native!(bool, Bool);
impl_native!(i64, Integer);
impl_native!(f64, Float);
impl_native!(NaiveDate, Date);
impl_native!(NaiveTime, Time);
impl_native!(NaiveDateTime, DateTime);

impl NativeValue for Value {
    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl<T: NativeValue> NativeValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(NativeValue::into_value).collect())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars() {
        assert_eq!(String::from_value("x".into()), Some("x".to_string()));
        assert_eq!(i64::from_value(Value::Integer(3)), Some(3));
        assert_eq!(i64::from_value(Value::Float(3.0)), None);
        assert_eq!(true.into_value(), Value::Bool(true));
    }

    #[test]
    fn lists() {
        let tags = vec!["a".to_string(), "c".to_string()];
        let value = tags.clone().into_value();
        assert_eq!(value, Value::from(vec!["a", "c"]));
        assert_eq!(Vec::<String>::from_value(value), Some(tags));
        assert_eq!(
            Vec::<String>::from_value(Value::List(vec![Value::Integer(1)])),
            None
        );
    }
}
