use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{invalid_argument, Result};

/// A stored field value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// A document's stored fields.
pub type Fields = BTreeMap<String, Value>;

/// Write-time transform applied to a single field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    ArrayUnion(Vec<Value>),
    ArrayRemove(Vec<Value>),
    IncrementInteger(i64),
    IncrementDouble(f64),
    Delete,
    ServerTimestamp,
}

/// One field of a write payload.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteValue {
    Value(Value),
    FieldValue(FieldValue),
}

/// Payload for set, update, and add operations.
pub type WriteData = BTreeMap<String, WriteValue>;

/// Field name the store uses to address a document's key in queries.
pub const DOCUMENT_ID_FIELD: &str = "__name__";

/// A dotted path into a document's fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return Err(invalid_argument("field path segments must be non-empty"));
        }
        Ok(Self { segments })
    }

    pub fn from_dot_separated(path: &str) -> Result<Self> {
        Self::new(path.split('.'))
    }

    /// The reserved path addressing the document key.
    pub fn document_id() -> Self {
        Self {
            segments: vec![DOCUMENT_ID_FIELD.to_string()],
        }
    }

    pub fn is_key_path(&self) -> bool {
        self.segments.len() == 1 && self.segments[0] == DOCUMENT_ID_FIELD
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn canonical_string(&self) -> String {
        self.segments.join(".")
    }
}

/// Resolves a field path against stored fields, descending through maps.
pub(crate) fn value_at<'a>(fields: &'a Fields, segments: &[String]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let value = fields.get(first)?;
    if rest.is_empty() {
        return Some(value);
    }
    match value {
        Value::Map(child) => value_at(child, rest),
        _ => None,
    }
}
