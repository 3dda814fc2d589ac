//! Codec families and their encode/decode/equality rules.

use crate::error::{CodecError, CodecResult};
use crate::query::QueryValue;
use crate::value::{Value, ValueKind};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const TRUE_TOKEN: &str = "true";
const FALSE_TOKEN: &str = "false";

/// Function turning a native value into a single query string value.
pub type EncodeFn = Arc<dyn Fn(&Value) -> CodecResult<String> + Send + Sync>;

/// Function turning a single query string value into a native value.
pub type DecodeFn = Arc<dyn Fn(&str) -> CodecResult<Value> + Send + Sync>;

/// What a multi-choice decoder does with elements outside the options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidElements {
    /// Drop unknown elements and keep the rest.
    #[default]
    Discard,
    /// Fail on the first unknown element.
    Reject,
}

/// The allowed options of a choice widget.
///
/// All options share one scalar family, which is also the family raw
/// query values are decoded into before the membership check.
#[derive(Debug, Clone, PartialEq)]
pub struct Choices {
    kind: ValueKind,
    options: Vec<Value>,
}

impl Choices {
    /// Creates a choice set.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidOptions`] if the options mix families,
    /// contain lists, or contain non-finite floats.
    pub fn new(options: Vec<Value>) -> CodecResult<Self> {
        let kind = options.first().map_or(ValueKind::Text, Value::kind);
        if kind == ValueKind::List {
            return Err(CodecError::invalid_options("options cannot be lists"));
        }
        if let Some(odd) = options.iter().find(|o| o.kind() != kind) {
            return Err(CodecError::invalid_options(format!(
                "options mix {kind} and {} values ({odd:?})",
                odd.kind()
            )));
        }
        if options
            .iter()
            .any(|o| matches!(o, Value::Float(f) if !f.is_finite()))
        {
            return Err(CodecError::invalid_options("options contain a non-finite float"));
        }
        Ok(Self { kind, options })
    }

    /// The scalar family of the options.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// The options in presentation order.
    pub fn options(&self) -> &[Value] {
        &self.options
    }

    /// Returns true if `value` is one of the options.
    pub fn contains(&self, value: &Value) -> bool {
        self.options.contains(value)
    }

    /// Position of `value` among the options.
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.options.iter().position(|o| o == value)
    }

    fn encode_member(&self, value: &Value, codec: &str) -> CodecResult<String> {
        if !self.contains(value) {
            return Err(CodecError::encode(value, codec, "not one of the options"));
        }
        encode_scalar(self.kind, value, codec)
    }

    fn decode_member(&self, raw: &str, codec: &str) -> CodecResult<Value> {
        let value = decode_scalar(self.kind, raw, codec)?;
        if self.contains(&value) {
            Ok(value)
        } else {
            Err(CodecError::decode(raw, codec, "not one of the options"))
        }
    }
}

/// A caller-defined single-valued codec.
#[derive(Clone)]
pub struct CustomCodec {
    name: String,
    kind: ValueKind,
    encode: EncodeFn,
    decode: DecodeFn,
}

impl CustomCodec {
    /// Creates a custom codec producing values of family `kind`.
    pub fn new<E, D>(name: impl Into<String>, kind: ValueKind, encode: E, decode: D) -> Self
    where
        E: Fn(&Value) -> CodecResult<String> + Send + Sync + 'static,
        D: Fn(&str) -> CodecResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }

    /// The registered name of this codec.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCodec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Converts between native values and their query-string representation.
///
/// Every family satisfies `decode(encode(v)) == v` for `v` in its domain.
#[derive(Debug, Clone)]
pub enum Codec {
    /// Identity on text. The empty string is a value, not absence.
    Text,
    /// `true` / `false`, case-insensitive on decode.
    Bool,
    /// Base-10 `i64`.
    Integer,
    /// Base-10 finite `f64`.
    Float,
    /// `YYYY-MM-DD`.
    Date,
    /// `HH:MM:SS[.fraction]`.
    Time,
    /// `YYYY-MM-DDTHH:MM:SS[.fraction]`.
    DateTime,
    /// One value out of a fixed set.
    Choice(Choices),
    /// Any number of values out of a fixed set, in selection order.
    MultiChoice {
        /// Allowed elements.
        choices: Choices,
        /// Handling of unknown elements on decode.
        invalid: InvalidElements,
    },
    /// Caller-supplied single-valued codec.
    Custom(CustomCodec),
}

impl Codec {
    /// Creates a single-choice codec.
    pub fn choice(options: Vec<Value>) -> CodecResult<Self> {
        Ok(Codec::Choice(Choices::new(options)?))
    }

    /// Creates a multi-choice codec.
    ///
    /// The empty string is reserved for the empty selection and cannot be
    /// an option.
    pub fn multi_choice(options: Vec<Value>, invalid: InvalidElements) -> CodecResult<Self> {
        let choices = Choices::new(options)?;
        if choices.contains(&Value::Text(String::new())) {
            return Err(CodecError::invalid_options(
                "the empty string cannot be a multi-choice option",
            ));
        }
        Ok(Codec::MultiChoice { choices, invalid })
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Codec::Text => "text",
            Codec::Bool => "bool",
            Codec::Integer => "integer",
            Codec::Float => "float",
            Codec::Date => "date",
            Codec::Time => "time",
            Codec::DateTime => "datetime",
            Codec::Choice(_) => "choice",
            Codec::MultiChoice { .. } => "multi_choice",
            Codec::Custom(custom) => custom.name(),
        }
    }

    /// The family of native values this codec produces.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Codec::Text => ValueKind::Text,
            Codec::Bool => ValueKind::Bool,
            Codec::Integer => ValueKind::Integer,
            Codec::Float => ValueKind::Float,
            Codec::Date => ValueKind::Date,
            Codec::Time => ValueKind::Time,
            Codec::DateTime => ValueKind::DateTime,
            Codec::Choice(choices) => choices.kind(),
            Codec::MultiChoice { .. } => ValueKind::List,
            Codec::Custom(custom) => custom.kind,
        }
    }

    /// The allowed options, for choice codecs.
    pub fn choices(&self) -> Option<&Choices> {
        match self {
            Codec::Choice(choices) | Codec::MultiChoice { choices, .. } => Some(choices),
            _ => None,
        }
    }

    /// Encodes a native value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if the value is outside the domain.
    pub fn encode(&self, value: &Value) -> CodecResult<QueryValue> {
        let name = self.name();
        match self {
            Codec::Choice(choices) => choices.encode_member(value, name).map(QueryValue::Single),
            Codec::MultiChoice { choices, .. } => {
                let Value::List(items) = value else {
                    return Err(CodecError::encode(value, name, "expected a list"));
                };
                if items.is_empty() {
                    return Ok(QueryValue::Single(String::new()));
                }
                items
                    .iter()
                    .map(|item| choices.encode_member(item, name))
                    .collect::<CodecResult<Vec<_>>>()
                    .map(QueryValue::Multi)
            }
            Codec::Custom(custom) => {
                if value.kind() != custom.kind {
                    return Err(CodecError::encode(
                        value,
                        name,
                        format!("expected a {} value", custom.kind),
                    ));
                }
                (custom.encode)(value).map(QueryValue::Single)
            }
            _ => encode_scalar(self.value_kind(), value, name).map(QueryValue::Single),
        }
    }

    /// Decodes a raw query representation.
    ///
    /// # Errors
    ///
    /// Returns a decode-side [`CodecError`] if the representation is
    /// empty, malformed, or outside the declared domain.
    pub fn decode(&self, raw: &QueryValue) -> CodecResult<Value> {
        let name = self.name();
        match self {
            Codec::MultiChoice { choices, invalid } => {
                let values = raw.values();
                if values.is_empty() {
                    return Err(CodecError::Missing {
                        expected: name.to_string(),
                    });
                }
                if values == [""] {
                    return Ok(Value::List(Vec::new()));
                }
                let mut out = Vec::with_capacity(values.len());
                for item in values {
                    match choices.decode_member(item, name) {
                        Ok(value) => out.push(value),
                        Err(err) if *invalid == InvalidElements::Reject => return Err(err),
                        Err(_) => {}
                    }
                }
                Ok(Value::List(out))
            }
            Codec::Choice(choices) => choices.decode_member(single(raw, name)?, name),
            Codec::Custom(custom) => {
                let text = single(raw, name)?;
                let value = (custom.decode)(text)?;
                if value.kind() != custom.kind {
                    return Err(CodecError::decode(
                        text,
                        name,
                        format!("decoder produced a {} value", value.kind()),
                    ));
                }
                Ok(value)
            }
            _ => decode_scalar(self.value_kind(), single(raw, name)?, name),
        }
    }

    /// The same codec, failing on unknown multi-choice elements.
    ///
    /// Used for values written by a developer, where a dropped element is
    /// a typo rather than a stale link.
    pub fn strict(&self) -> Codec {
        match self {
            Codec::MultiChoice { choices, .. } => Codec::MultiChoice {
                choices: choices.clone(),
                invalid: InvalidElements::Reject,
            },
            other => other.clone(),
        }
    }

    /// Type-specific equality used to decide whether a value is the default.
    ///
    /// Multi-choice values compare as sets; everything else compares exactly.
    pub fn values_equal(&self, a: &Value, b: &Value) -> bool {
        match (self, a, b) {
            (Codec::MultiChoice { .. }, Value::List(left), Value::List(right)) => {
                left.iter().all(|item| right.contains(item))
                    && right.iter().all(|item| left.contains(item))
            }
            _ => a == b,
        }
    }

    /// Returns true if two codecs read and write a key identically.
    pub fn is_compatible(&self, other: &Codec) -> bool {
        match (self, other) {
            (Codec::Choice(a), Codec::Choice(b)) => a == b,
            (
                Codec::MultiChoice {
                    choices: a,
                    invalid: ia,
                },
                Codec::MultiChoice {
                    choices: b,
                    invalid: ib,
                },
            ) => a == b && ia == ib,
            (Codec::Custom(a), Codec::Custom(b)) => a.name == b.name && a.kind == b.kind,
            (Codec::Choice(_) | Codec::MultiChoice { .. } | Codec::Custom(_), _)
            | (_, Codec::Choice(_) | Codec::MultiChoice { .. } | Codec::Custom(_)) => false,
            _ => self.value_kind() == other.value_kind(),
        }
    }
}

fn single<'a>(raw: &'a QueryValue, codec: &str) -> CodecResult<&'a str> {
    match raw.values() {
        [only] => Ok(only),
        [] => Err(CodecError::Missing {
            expected: codec.to_string(),
        }),
        many => Err(CodecError::MultipleValues {
            expected: codec.to_string(),
            count: many.len(),
        }),
    }
}

fn encode_scalar(kind: ValueKind, value: &Value, codec: &str) -> CodecResult<String> {
    match (kind, value) {
        (ValueKind::Text, Value::Text(s)) => Ok(s.clone()),
        (ValueKind::Bool, Value::Bool(b)) => Ok(if *b { TRUE_TOKEN } else { FALSE_TOKEN }.into()),
        (ValueKind::Integer, Value::Integer(i)) => Ok(i.to_string()),
        (ValueKind::Float, Value::Float(f)) => {
            if f.is_finite() {
                // Display emits the shortest text that parses back to the same f64.
                Ok(f.to_string())
            } else {
                Err(CodecError::encode(value, codec, "not a finite number"))
            }
        }
        (ValueKind::Date, Value::Date(d)) => {
            check_year(d.year(), value, codec)?;
            Ok(d.format(DATE_FORMAT).to_string())
        }
        (ValueKind::Time, Value::Time(t)) => Ok(t.format(TIME_FORMAT).to_string()),
        (ValueKind::DateTime, Value::DateTime(dt)) => {
            check_year(dt.year(), value, codec)?;
            Ok(dt.format(DATETIME_FORMAT).to_string())
        }
        _ => Err(CodecError::encode(
            value,
            codec,
            format!("expected a {kind} value"),
        )),
    }
}

fn check_year(year: i32, value: &Value, codec: &str) -> CodecResult<()> {
    if (0..=9999).contains(&year) {
        Ok(())
    } else {
        Err(CodecError::encode(value, codec, "year outside 0000-9999"))
    }
}

fn decode_scalar(kind: ValueKind, raw: &str, codec: &str) -> CodecResult<Value> {
    let fail = |reason: &str| CodecError::decode(raw, codec, reason);
    match kind {
        ValueKind::Text => Ok(Value::Text(raw.to_string())),
        ValueKind::Bool => {
            if raw.eq_ignore_ascii_case(TRUE_TOKEN) {
                Ok(Value::Bool(true))
            } else if raw.eq_ignore_ascii_case(FALSE_TOKEN) {
                Ok(Value::Bool(false))
            } else {
                Err(fail("expected true or false"))
            }
        }
        ValueKind::Integer => raw
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| fail(&e.to_string())),
        ValueKind::Float => match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Float(f)),
            Ok(_) => Err(fail("not a finite number")),
            Err(e) => Err(fail(&e.to_string())),
        },
        ValueKind::Date => {
            if !is_date_layout(raw) {
                return Err(fail("expected YYYY-MM-DD"));
            }
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(Value::Date)
                .map_err(|e| fail(&e.to_string()))
        }
        ValueKind::Time => {
            if !is_time_layout(raw) {
                return Err(fail("expected HH:MM:SS[.fraction]"));
            }
            NaiveTime::parse_from_str(raw, TIME_FORMAT)
                .map(Value::Time)
                .map_err(|e| fail(&e.to_string()))
        }
        ValueKind::DateTime => {
            let layout_ok = raw.split_once('T').is_some_and(|(date, time)| {
                is_date_layout(date) && is_time_layout(time)
            });
            if !layout_ok {
                return Err(fail("expected YYYY-MM-DDTHH:MM:SS[.fraction]"));
            }
            NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
                .map(Value::DateTime)
                .map_err(|e| fail(&e.to_string()))
        }
        ValueKind::List => Err(fail("lists need a multi-choice codec")),
    }
}

/// Matches `raw` against `layout`, where `9` stands for one ASCII digit.
fn matches_layout(raw: &str, layout: &str) -> bool {
    raw.len() == layout.len()
        && raw.bytes().zip(layout.bytes()).all(|(c, l)| match l {
            b'9' => c.is_ascii_digit(),
            _ => c == l,
        })
}

fn is_date_layout(raw: &str) -> bool {
    matches_layout(raw, "9999-99-99")
}

fn is_time_layout(raw: &str) -> bool {
    let (clock, fraction) = match raw.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (raw, None),
    };
    matches_layout(clock, "99:99:99")
        && fraction.is_none_or(|f| {
            (1..=9).contains(&f.len()) && f.bytes().all(|c| c.is_ascii_digit())
        })
}
