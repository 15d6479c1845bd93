//! Field rules for target records.
//!
//! Each numeric field maps to a [`Bound`]; the IPv4 field is checked by a
//! syntax pattern plus an octet range check.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::target::Field;

/// Message for a field that is missing from a full record.
pub const REQUIRED: &str = "Required field";

/// Message for a value that does not parse as a finite number.
pub const INVALID_NUMBER: &str = "Must be a valid number";

/// Message for a malformed IPv4 address.
pub const INVALID_IPV4: &str = "Must be a valid IPv4 address";

/// Message for a number below its lower limit, shared by speed and the
/// relaxed frequency rule. Speed still accepts zero.
pub const NOT_POSITIVE: &str = "Must be a positive number";

/// Frequencies accepted under [`FrequencyPolicy::FixedSet`].
pub const ALLOWED_FREQUENCIES: [f64; 5] = [433.0, 915.0, 2.4, 5.2, 5.8];

/// Dotted-quad syntax. Octet values are range-checked separately.
pub const IPV4_PATTERN: &str = r"^([0-9]{1,3}\.){3}[0-9]{1,3}$";

/// How the `frequency` field is constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyPolicy {
    /// Must equal one of [`ALLOWED_FREQUENCIES`].
    #[default]
    FixedSet,
    /// Any number greater than zero.
    AnyPositive,
}

impl std::fmt::Display for FrequencyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedSet => write!(f, "fixed_set"),
            Self::AnyPositive => write!(f, "any_positive"),
        }
    }
}

/// The domain of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// Any finite number.
    Any,
    /// Inclusive range.
    Range {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Zero or greater. Rejections carry [`NOT_POSITIVE`].
    NonNegative,
    /// Strictly greater than zero.
    Positive,
    /// Exact member of a fixed set.
    OneOf(&'static [f64]),
}

impl Bound {
    /// The bound that applies to a numeric field.
    #[must_use]
    pub fn for_field(field: Field, policy: FrequencyPolicy) -> Self {
        match field {
            Field::Latitude => Self::Range {
                min: -90.0,
                max: 90.0,
            },
            Field::Longitude => Self::Range {
                min: -180.0,
                max: 180.0,
            },
            Field::Bearing => Self::Range {
                min: 0.0,
                max: 360.0,
            },
            Field::Speed => Self::NonNegative,
            Field::Frequency => match policy {
                FrequencyPolicy::FixedSet => Self::OneOf(&ALLOWED_FREQUENCIES),
                FrequencyPolicy::AnyPositive => Self::Positive,
            },
            Field::Altitude | Field::IpAddress => Self::Any,
        }
    }

    /// Check a parsed value against the bound.
    ///
    /// # Errors
    ///
    /// Returns the human-readable reason when the value is out of bounds.
    #[allow(clippy::float_cmp)]
    pub fn check(self, value: f64) -> Result<(), String> {
        match self {
            Self::Any => Ok(()),
            Self::Range { min, max } if value < min || value > max => {
                Err(format!("Must be between {min} and {max}"))
            }
            Self::NonNegative if value < 0.0 => Err(NOT_POSITIVE.to_string()),
            Self::Positive if value <= 0.0 => Err(NOT_POSITIVE.to_string()),
            Self::OneOf(allowed) if !allowed.iter().any(|a| *a == value) => {
                let listed: Vec<String> = allowed.iter().map(f64::to_string).collect();
                Err(format!("Must be one of: [{}]", listed.join(", ")))
            }
            _ => Ok(()),
        }
    }
}

/// Parse a raw value as a finite number.
///
/// JSON numbers are taken as-is; strings are trimmed and parsed. Anything
/// else, and any non-finite result, yields `None`.
#[must_use]
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Compiled IPv4 address checker.
#[derive(Debug, Clone)]
pub struct Ipv4Rule {
    regex: Regex,
}

impl Ipv4Rule {
    /// Compile the rule.
    ///
    /// # Panics
    ///
    /// Panics if [`IPV4_PATTERN`] is not a valid regex.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regex: Regex::new(IPV4_PATTERN).expect("Invalid IPv4 regex pattern"),
        }
    }

    /// Check that the text is a dotted quad with every octet in `0..=255`.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
            && text
                .split('.')
                .all(|octet| octet.parse::<u16>().is_ok_and(|n| n <= 255))
    }
}

impl Default for Ipv4Rule {
    fn default() -> Self {
        Self::new()
    }
}
