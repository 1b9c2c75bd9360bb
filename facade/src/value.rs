use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::field_value::FieldValue;

/// A stored field value in the neutral data model.
///
/// Write sentinels are deliberately not part of this enum; they only appear
/// in write payloads as [`WriteField::Sentinel`] and are consumed by the
/// backing store, never read back.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn from_text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    /// Renders the value as JSON for typed decoding. Timestamps become
    /// RFC 3339 strings, which is what `chrono`'s serde support expects.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(flag) => serde_json::Value::Bool(*flag),
            Value::Integer(value) => serde_json::Value::from(*value),
            Value::Double(value) => serde_json::Value::from(*value),
            Value::Text(text) => serde_json::Value::String(text.clone()),
            Value::Timestamp(at) => {
                serde_json::Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Array(values) => {
                serde_json::Value::Array(values.iter().map(Value::to_json).collect())
            }
            Value::Map(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Boolean(flag)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

/// One field in a write payload: either a concrete value or a sentinel.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteField {
    Value(Value),
    Sentinel(FieldValue),
}

impl From<Value> for WriteField {
    fn from(value: Value) -> Self {
        WriteField::Value(value)
    }
}

impl From<FieldValue> for WriteField {
    fn from(sentinel: FieldValue) -> Self {
        WriteField::Sentinel(sentinel)
    }
}

/// Top-level write payload for set, update, and add operations.
pub type DocumentData = BTreeMap<String, WriteField>;
