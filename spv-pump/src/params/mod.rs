//! Settable parameters and their legal value domains.
//!
//! Every value written to the pump goes through [`Registry::validate`]
//! first, so a bad value is rejected locally instead of being sent and
//! silently ignored by the device. The registry is a plain value: build it
//! once (usually [`Registry::default`], the SPV table) and hand it to the
//! client.

mod table;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

pub(crate) use table::SLOTS;

/// Errors from validating a parameter write.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("{name}: value {value} outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{name}: {value:?} is not one of {allowed:?}")]
    InvalidEnumValue {
        name: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{name}: expected {expected}, got {value}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        value: ParamValue,
    },
}

/// A value to be written to a parameter.
///
/// The wire protocol carries everything as text in the `val` query
/// parameter, but the domains distinguish integers from strings, so the
/// distinction is kept until the request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    Str(String),
}

impl ParamValue {
    /// Whether a JSON value from an echo response confirms this value.
    ///
    /// The pump is not consistent about echoing numbers as JSON numbers or
    /// numeric strings, so both forms are accepted for integers. A string
    /// echo must be the decimal form of the value exactly.
    pub fn matches_echo(&self, echoed: &Value) -> bool {
        match (self, echoed) {
            (ParamValue::Int(expected), Value::Number(n)) => n.as_i64() == Some(*expected),
            (ParamValue::Int(expected), Value::String(s)) => *s == expected.to_string(),
            (ParamValue::Str(expected), Value::String(s)) => s == expected,
            (ParamValue::Str(expected), Value::Number(n)) => n.to_string() == *expected,
            _ => false,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<u8> for ParamValue {
    fn from(v: u8) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

/// Legal values for one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    /// Integer in `[min, max]`, inclusive on both ends.
    Range { min: i64, max: i64 },

    /// One of a fixed set of string tokens, compared case-sensitively.
    OneOf(Vec<String>),

    /// Any string.
    FreeString,

    /// Exactly one integer value.
    SinglePoint(i64),
}

impl Domain {
    pub fn range(min: i64, max: i64) -> Self {
        Domain::Range { min, max }
    }

    pub fn one_of<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Domain::OneOf(tokens.into_iter().map(Into::into).collect())
    }

    /// Check `value` against this domain, naming `name` in any error.
    pub fn check(&self, name: &str, value: &ParamValue) -> Result<(), ValidationError> {
        match (self, value) {
            (Domain::Range { min, max }, ParamValue::Int(v)) => {
                if (*min..=*max).contains(v) {
                    Ok(())
                } else {
                    Err(ValidationError::OutOfRange {
                        name: name.to_string(),
                        value: *v,
                        min: *min,
                        max: *max,
                    })
                }
            }
            (Domain::SinglePoint(point), ParamValue::Int(v)) => {
                if v == point {
                    Ok(())
                } else {
                    Err(ValidationError::OutOfRange {
                        name: name.to_string(),
                        value: *v,
                        min: *point,
                        max: *point,
                    })
                }
            }
            (Domain::OneOf(tokens), ParamValue::Str(s)) => {
                if tokens.iter().any(|t| t == s) {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidEnumValue {
                        name: name.to_string(),
                        value: s.clone(),
                        allowed: tokens.clone(),
                    })
                }
            }
            (Domain::FreeString, ParamValue::Str(_)) => Ok(()),
            (domain, value) => Err(ValidationError::TypeMismatch {
                name: name.to_string(),
                expected: domain.expected_type(),
                value: value.clone(),
            }),
        }
    }

    /// Interpret raw text (e.g. from a command line) as a value of the type
    /// this domain expects. Text that is not an integer is passed through as
    /// a string so that validation reports the mismatch.
    pub fn parse_value(&self, raw: &str) -> ParamValue {
        match self {
            Domain::Range { .. } | Domain::SinglePoint(_) => raw
                .trim()
                .parse::<i64>()
                .map(ParamValue::Int)
                .unwrap_or_else(|_| ParamValue::Str(raw.to_string())),
            Domain::OneOf(_) | Domain::FreeString => ParamValue::Str(raw.to_string()),
        }
    }

    fn expected_type(&self) -> &'static str {
        match self {
            Domain::Range { .. } | Domain::SinglePoint(_) => "an integer",
            Domain::OneOf(_) | Domain::FreeString => "a string",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Range { min, max } => write!(f, "{min}..={max}"),
            Domain::OneOf(tokens) => write!(f, "one of {}", tokens.join("|")),
            Domain::FreeString => f.write_str("any string"),
            Domain::SinglePoint(v) => write!(f, "exactly {v}"),
        }
    }
}

/// Table of settable parameter names and their domains.
///
/// Read-only once built. Cloning is cheap enough that each client owns
/// its copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<String, Domain>,
}

impl Registry {
    /// Build a registry from `(name, domain)` pairs. Later duplicates
    /// replace earlier ones.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Domain)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, domain)| (name.into(), domain))
                .collect(),
        }
    }

    /// Validate a write of `value` to `name`.
    pub fn validate(&self, name: &str, value: &ParamValue) -> Result<(), ValidationError> {
        self.entries
            .get(name)
            .ok_or_else(|| ValidationError::UnknownParameter(name.to_string()))?
            .check(name, value)
    }

    pub fn get(&self, name: &str) -> Option<&Domain> {
        self.entries.get(name)
    }

    /// All entries, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Domain)> {
        self.entries.iter().map(|(name, domain)| (name.as_str(), domain))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Registry {
    /// The SPV parameter table.
    fn default() -> Self {
        Self::from_entries(table::spv_entries())
    }
}
