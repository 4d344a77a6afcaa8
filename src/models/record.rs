use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier of a record in any collection. Seed files mix integer and
/// string ids, so both are accepted and compared through their string form.
/// Whole-number floats such as `1.0` are read as integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl RecordId {
    /// Reads an id out of a raw JSON value. Anything other than an integer, a
    /// whole-number float or a string yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(whole_number))
                .map(RecordId::Int),
            Value::String(s) => Some(RecordId::Str(s.clone())),
            _ => None,
        }
    }

    pub fn matches(&self, raw: &str) -> bool {
        match self {
            RecordId::Int(n) => n.to_string() == raw,
            RecordId::Str(s) => s == raw,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(n) => Value::from(*n),
            RecordId::Str(s) => Value::from(s.as_str()),
        }
    }
}

fn whole_number(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        RecordId::from_value(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid id {}: expected integer or string", raw)))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

/// True when `record[field]` holds an id equal to `raw`.
pub fn field_matches(record: &Value, field: &str, raw: &str) -> bool {
    record
        .get(field)
        .and_then(RecordId::from_value)
        .is_some_and(|id| id.matches(raw))
}
