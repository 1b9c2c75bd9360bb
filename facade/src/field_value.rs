use crate::value::Value;

/// Write-time sentinel instructing the backing store to transform a field.
///
/// Sentinels are interpreted during the write and never stored; a sentinel
/// kind this enum does not list cannot be expressed, so adapters always have
/// a defined mapping for every variant.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Appends the given elements to an array field, skipping elements that
    /// are already present.
    ArrayUnion(Vec<Value>),
    /// Removes every occurrence of the given elements from an array field.
    ArrayRemove(Vec<Value>),
    /// Increments an integer field. The operand is carried as a double and
    /// truncated to an integer by the adapter.
    IntegerIncrement(f64),
    /// Increments a floating-point field.
    DoubleIncrement(f64),
    /// Deletes the field from the document.
    Delete,
    /// Replaces the field with the server-assigned commit time.
    ServerTimestamp,
}

impl FieldValue {
    pub fn array_union(elements: impl IntoIterator<Item = Value>) -> Self {
        FieldValue::ArrayUnion(elements.into_iter().collect())
    }

    pub fn array_remove(elements: impl IntoIterator<Item = Value>) -> Self {
        FieldValue::ArrayRemove(elements.into_iter().collect())
    }
}
