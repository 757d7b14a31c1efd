//! Records decoded from the pump's bulk read payloads.
//!
//! Both bulk reads answer with one flat JSON object. Values are mostly
//! strings even when they are numbers, and flags are the string `"1"` for
//! set and anything else for clear. [`Payload`] wraps the object and
//! applies those rules per key, so the record types only name keys.

mod settings;
mod state;

use serde_json::{Map, Value};
use thiserror::Error;

pub use settings::{FreezeProtection, Language, PumpSettings, Schedule, SpeedPreset, TimeOfDay};
pub use state::PumpState;


/// Errors from decoding a payload into a record.
///
/// These mean the pump answered but not in the shape expected, which is a
/// protocol mismatch rather than a network problem.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(String),

    #[error("Missing key: {0}")]
    MissingKey(String),

    #[error("{key}: expected an integer, got {value}")]
    NotAnInteger { key: String, value: String },

    #[error("{key}: expected a string, got {value}")]
    NotAString { key: String, value: String },

    #[error("{key}: {value} outside [{min}, {max}]")]
    OutOfRange {
        key: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Borrowed view of a flat response object with typed accessors.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a>(&'a Map<String, Value>);

impl<'a> Payload<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self(map)
    }

    fn raw(&self, key: &str) -> Result<&'a Value, DecodeError> {
        self.0
            .get(key)
            .ok_or_else(|| DecodeError::MissingKey(key.to_string()))
    }

    /// A string field, returned as-is.
    pub fn string(&self, key: &str) -> Result<String, DecodeError> {
        match self.raw(key)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(DecodeError::NotAString {
                key: key.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// An integer field. The wire sends these as strings; a bare JSON
    /// integer is accepted too. Text that is not an integer is
    /// `NotAnInteger`; an integer that does not fit `T` (a negative count,
    /// a preset number above 255) is `OutOfRange` over the bounds of `T`.
    pub fn int<T: WireInt>(&self, key: &str) -> Result<T, DecodeError> {
        self.bounded(key, T::MIN, T::MAX)
    }

    /// An integer field that must lie in `[min, max]`.
    pub fn bounded<T>(&self, key: &str, min: i64, max: i64) -> Result<T, DecodeError>
    where
        T: TryFrom<i64>,
    {
        let value = self.integer(key)?;
        let out_of_range = || DecodeError::OutOfRange {
            key: key.to_string(),
            value,
            min,
            max,
        };
        if !(min..=max).contains(&value) {
            return Err(out_of_range());
        }
        T::try_from(value).map_err(|_| out_of_range())
    }

    fn integer(&self, key: &str) -> Result<i64, DecodeError> {
        let value = self.raw(key)?;
        let parsed = match value {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        };
        parsed.ok_or_else(|| DecodeError::NotAnInteger {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// A flag field: `true` only for the literal string `"1"`.
    pub fn flag(&self, key: &str) -> Result<bool, DecodeError> {
        Ok(matches!(self.raw(key)?, Value::String(s) if s == "1"))
    }
}

/// Integer types a payload field can decode into.
pub trait WireInt: TryFrom<i64> {
    const MIN: i64;
    const MAX: i64;
}

macro_rules! wire_int {
    ($($t:ty),*) => {
        $(impl WireInt for $t {
            const MIN: i64 = <$t>::MIN as i64;
            const MAX: i64 = <$t>::MAX as i64;
        })*
    };
}

wire_int!(u8, u16, u32, i8, i16, i32, i64);
