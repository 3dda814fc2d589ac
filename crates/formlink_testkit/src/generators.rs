//! Property-based test generators using proptest.
//!
//! Every strategy yields values inside the domain of its codec, so
//! `decode(encode(v)) == v` must hold for all of them.

use formlink_codec::{Codec, InvalidElements, NaiveDate, NaiveDateTime, NaiveTime, Value};
use proptest::prelude::*;

/// Strategy for arbitrary text, including the empty string.
pub fn text_strategy() -> impl Strategy<Value = String> {
    any::<String>()
}

/// Strategy for finite floats.
pub fn finite_float_strategy() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("float must be finite", |f| f.is_finite())
}

/// Strategy for dates with four-digit years.
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1i32..=9999, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d).expect("day 1-28 exists in every month")
    })
}

/// Strategy for times with nanosecond precision.
pub fn time_strategy() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60, 0u32..60, 0u32..1_000_000_000).prop_map(|(h, m, s, n)| {
        NaiveTime::from_hms_nano_opt(h, m, s, n).expect("components are in range")
    })
}

/// Strategy for date-times.
pub fn datetime_strategy() -> impl Strategy<Value = NaiveDateTime> {
    (date_strategy(), time_strategy()).prop_map(|(d, t)| d.and_time(t))
}

/// Strategy for a non-empty set of text options.
pub fn options_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9_]{0,7}", 1..6)
        .prop_map(|set| set.into_iter().collect())
}

/// Strategy for a single-choice codec with one of its options.
pub fn choice_strategy() -> impl Strategy<Value = (Codec, Value)> {
    options_strategy().prop_flat_map(|options| {
        let values: Vec<Value> = options.into_iter().map(Value::from).collect();
        let codec = Codec::choice(values.clone()).expect("distinct text options are valid");
        prop::sample::select(values).prop_map(move |v| (codec.clone(), v))
    })
}

/// Strategy for a multi-choice codec with a selection in arbitrary order.
pub fn multi_choice_strategy() -> impl Strategy<Value = (Codec, Value)> {
    options_strategy().prop_flat_map(|options| {
        let values: Vec<Value> = options.into_iter().map(Value::from).collect();
        let codec = Codec::multi_choice(values.clone(), InvalidElements::Reject)
            .expect("non-empty text options are valid");
        let len = values.len();
        prop::sample::subsequence(values, 0..=len)
            .prop_shuffle()
            .prop_map(move |selection| (codec.clone(), Value::List(selection)))
    })
}

/// Strategy for any built-in codec paired with a value in its domain.
pub fn codec_value_strategy() -> impl Strategy<Value = (Codec, Value)> {
    prop_oneof![
        text_strategy().prop_map(|s| (Codec::Text, Value::Text(s))),
        any::<bool>().prop_map(|b| (Codec::Bool, Value::Bool(b))),
        any::<i64>().prop_map(|i| (Codec::Integer, Value::Integer(i))),
        finite_float_strategy().prop_map(|f| (Codec::Float, Value::Float(f))),
        date_strategy().prop_map(|d| (Codec::Date, Value::Date(d))),
        time_strategy().prop_map(|t| (Codec::Time, Value::Time(t))),
        datetime_strategy().prop_map(|dt| (Codec::DateTime, Value::DateTime(dt))),
        choice_strategy(),
        multi_choice_strategy(),
    ]
}

/// Strategy for a codec with two values in its domain, usually distinct.
pub fn codec_value_pair_strategy() -> impl Strategy<Value = (Codec, Value, Value)> {
    codec_value_strategy().prop_flat_map(|(codec, first)| {
        let second = match &codec {
            Codec::Choice(choices) => prop::sample::select(choices.options().to_vec()).boxed(),
            Codec::MultiChoice { choices, .. } => {
                let options = choices.options().to_vec();
                let len = options.len();
                prop::sample::subsequence(options, 0..=len)
                    .prop_map(Value::List)
                    .boxed()
            }
            Codec::Text => text_strategy().prop_map(Value::Text).boxed(),
            Codec::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
            Codec::Integer => any::<i64>().prop_map(Value::Integer).boxed(),
            Codec::Float => finite_float_strategy().prop_map(Value::Float).boxed(),
            Codec::Date => date_strategy().prop_map(Value::Date).boxed(),
            Codec::Time => time_strategy().prop_map(Value::Time).boxed(),
            _ => datetime_strategy().prop_map(Value::DateTime).boxed(),
        };
        (Just(codec), Just(first), second)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn generated_values_match_codec_family((codec, value) in codec_value_strategy()) {
            prop_assert_eq!(value.kind(), codec.value_kind());
            prop_assert!(codec.encode(&value).is_ok());
        }

        #[test]
        fn choice_values_are_options((codec, value) in choice_strategy()) {
            let choices = codec.choices().unwrap();
            prop_assert!(choices.contains(&value));
        }
    }
}
