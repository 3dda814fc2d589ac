//! Default omission policy.

use formlink_codec::{Codec, Value};
use serde::{Deserialize, Serialize};

/// Whether a value belongs in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Write the value.
    Keep,
    /// Remove the key; absence means "default".
    Omit,
}

/// Rule for leaving default values out of the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    /// Values equal to their default are removed, keeping URLs short.
    #[default]
    OmitDefaults,
    /// Every value is written, defaults included.
    KeepAll,
}

impl DefaultPolicy {
    /// Decides whether `current` should appear in the query string.
    pub fn decide(self, codec: &Codec, current: &Value, default: &Value) -> Decision {
        match self {
            DefaultPolicy::OmitDefaults if is_default(codec, current, default) => Decision::Omit,
            _ => Decision::Keep,
        }
    }
}

/// Returns true if `current` equals `default` under the codec's equality.
///
/// Multi-choice selections compare as sets; numbers compare exactly.
pub fn is_default(codec: &Codec, current: &Value, default: &Value) -> bool {
    codec.values_equal(current, default)
}
