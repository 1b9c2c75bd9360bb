//! Value, enum, and error conversions between the neutral contract and the
//! store's native types.
//!
//! Neutral-to-native conversions are total: the neutral model is a subset of
//! what the store expresses. Native-to-neutral conversions fail with
//! `UnrecognizedEnumValue` when a newer store reports an enum variant this
//! adapter predates.

use firestore_facade as facade;
use firestore_memstore as native;

use facade::error::{unrecognized_enum_value, unsupported_implementation};
use facade::{FirestoreError, FirestoreErrorCode, FirestoreResult};

use crate::batch::{TransactionWrapper, WriteBatchWrapper};
use crate::collection::{CollectionReferenceWrapper, QueryWrapper};
use crate::database::FirestoreWrapper;
use crate::document::{DocumentReferenceWrapper, DocumentSnapshotWrapper, SnapshotMetadataWrapper};

/// Wraps a native store handle behind the neutral contract.
pub fn wrap_firestore(store: native::Firestore) -> Box<dyn facade::Firestore> {
    Box::new(FirestoreWrapper::new(store))
}

pub fn unwrap_firestore(store: &dyn facade::Firestore) -> FirestoreResult<&native::Firestore> {
    store
        .as_any()
        .downcast_ref::<FirestoreWrapper>()
        .map(FirestoreWrapper::native)
        .ok_or_else(|| unsupported_implementation("Firestore"))
}

pub fn unwrap_document_reference(
    reference: &dyn facade::DocumentReference,
) -> FirestoreResult<&native::DocumentReference> {
    reference
        .as_any()
        .downcast_ref::<DocumentReferenceWrapper>()
        .map(DocumentReferenceWrapper::native)
        .ok_or_else(|| unsupported_implementation("DocumentReference"))
}

pub fn unwrap_collection_reference(
    collection: &dyn facade::CollectionReference,
) -> FirestoreResult<&native::CollectionReference> {
    collection
        .as_any()
        .downcast_ref::<CollectionReferenceWrapper>()
        .map(CollectionReferenceWrapper::native)
        .ok_or_else(|| unsupported_implementation("CollectionReference"))
}

pub fn unwrap_query(query: &dyn facade::Query) -> FirestoreResult<&native::Query> {
    query
        .as_any()
        .downcast_ref::<QueryWrapper>()
        .map(QueryWrapper::native)
        .ok_or_else(|| unsupported_implementation("Query"))
}

pub fn unwrap_document_snapshot(
    snapshot: &dyn facade::DocumentSnapshot,
) -> FirestoreResult<&native::DocumentSnapshot> {
    snapshot
        .as_any()
        .downcast_ref::<DocumentSnapshotWrapper>()
        .map(DocumentSnapshotWrapper::native)
        .ok_or_else(|| unsupported_implementation("DocumentSnapshot"))
}

pub fn unwrap_snapshot_metadata(
    metadata: &dyn facade::SnapshotMetadata,
) -> FirestoreResult<native::SnapshotMetadata> {
    metadata
        .as_any()
        .downcast_ref::<SnapshotMetadataWrapper>()
        .map(SnapshotMetadataWrapper::native)
        .ok_or_else(|| unsupported_implementation("SnapshotMetadata"))
}

pub fn unwrap_transaction(
    transaction: &dyn facade::Transaction,
) -> FirestoreResult<&native::Transaction> {
    transaction
        .as_any()
        .downcast_ref::<TransactionWrapper>()
        .map(TransactionWrapper::native)
        .ok_or_else(|| unsupported_implementation("Transaction"))
}

pub fn unwrap_write_batch(batch: &dyn facade::WriteBatch) -> FirestoreResult<&native::WriteBatch> {
    batch
        .as_any()
        .downcast_ref::<WriteBatchWrapper>()
        .map(WriteBatchWrapper::native)
        .ok_or_else(|| unsupported_implementation("WriteBatch"))
}

pub fn change_type_to_facade(
    change_type: native::DocumentChangeType,
) -> FirestoreResult<facade::DocumentChangeType> {
    match change_type {
        native::DocumentChangeType::Added => Ok(facade::DocumentChangeType::Added),
        native::DocumentChangeType::Modified => Ok(facade::DocumentChangeType::Modified),
        native::DocumentChangeType::Removed => Ok(facade::DocumentChangeType::Removed),
        other => Err(unrecognized_enum_value(
            "DocumentChangeType",
            format!("{other:?}"),
        )),
    }
}

/// Total: an unrecognized neutral preference degrades to the native default
/// rather than failing the read it rides on.
pub fn source_to_native(source: facade::Source) -> native::Source {
    match source {
        facade::Source::Default => native::Source::Default,
        facade::Source::Server => native::Source::Server,
        facade::Source::Cache => native::Source::Cache,
        _ => native::Source::Default,
    }
}

pub fn filter_operator_to_native(operator: facade::FilterOperator) -> native::FilterOperator {
    match operator {
        facade::FilterOperator::Equal => native::FilterOperator::Equal,
        facade::FilterOperator::NotEqual => native::FilterOperator::NotEqual,
        facade::FilterOperator::LessThan => native::FilterOperator::LessThan,
        facade::FilterOperator::LessThanOrEqual => native::FilterOperator::LessThanOrEqual,
        facade::FilterOperator::GreaterThan => native::FilterOperator::GreaterThan,
        facade::FilterOperator::GreaterThanOrEqual => native::FilterOperator::GreaterThanOrEqual,
        facade::FilterOperator::ArrayContains => native::FilterOperator::ArrayContains,
    }
}

pub fn sort_direction_to_native(direction: facade::SortDirection) -> native::SortDirection {
    match direction {
        facade::SortDirection::Ascending => native::SortDirection::Ascending,
        facade::SortDirection::Descending => native::SortDirection::Descending,
    }
}

/// Total over all six sentinel kinds. The integer increment operand arrives
/// as a double and is truncated toward zero.
pub fn field_value_to_native(sentinel: facade::FieldValue) -> native::FieldValue {
    match sentinel {
        facade::FieldValue::ArrayUnion(elements) => {
            native::FieldValue::ArrayUnion(elements.into_iter().map(value_to_native).collect())
        }
        facade::FieldValue::ArrayRemove(elements) => {
            native::FieldValue::ArrayRemove(elements.into_iter().map(value_to_native).collect())
        }
        facade::FieldValue::IntegerIncrement(operand) => {
            native::FieldValue::IncrementInteger(operand as i64)
        }
        facade::FieldValue::DoubleIncrement(operand) => {
            native::FieldValue::IncrementDouble(operand)
        }
        facade::FieldValue::Delete => native::FieldValue::Delete,
        facade::FieldValue::ServerTimestamp => native::FieldValue::ServerTimestamp,
    }
}

pub fn field_path_to_native(path: &facade::FieldPath) -> FirestoreResult<native::FieldPath> {
    // The identity flag wins over the segment list.
    if path.is_document_id() {
        return Ok(native::FieldPath::document_id());
    }
    native::FieldPath::new(path.segments().iter().cloned()).map_err(error_to_facade)
}

pub fn value_to_native(value: facade::Value) -> native::Value {
    match value {
        facade::Value::Null => native::Value::Null,
        facade::Value::Boolean(flag) => native::Value::Boolean(flag),
        facade::Value::Integer(value) => native::Value::Integer(value),
        facade::Value::Double(value) => native::Value::Double(value),
        facade::Value::Text(text) => native::Value::String(text),
        facade::Value::Timestamp(at) => native::Value::Timestamp(at),
        facade::Value::Array(values) => {
            native::Value::Array(values.into_iter().map(value_to_native).collect())
        }
        facade::Value::Map(fields) => native::Value::Map(
            fields
                .into_iter()
                .map(|(name, value)| (name, value_to_native(value)))
                .collect(),
        ),
    }
}

pub fn value_to_facade(value: native::Value) -> facade::Value {
    match value {
        native::Value::Null => facade::Value::Null,
        native::Value::Boolean(flag) => facade::Value::Boolean(flag),
        native::Value::Integer(value) => facade::Value::Integer(value),
        native::Value::Double(value) => facade::Value::Double(value),
        native::Value::String(text) => facade::Value::Text(text),
        native::Value::Timestamp(at) => facade::Value::Timestamp(at),
        native::Value::Array(values) => {
            facade::Value::Array(values.into_iter().map(value_to_facade).collect())
        }
        native::Value::Map(fields) => facade::Value::Map(
            fields
                .into_iter()
                .map(|(name, value)| (name, value_to_facade(value)))
                .collect(),
        ),
    }
}

pub fn write_data_to_native(data: facade::DocumentData) -> native::WriteData {
    data.into_iter()
        .map(|(name, field)| {
            let write_value = match field {
                facade::WriteField::Value(value) => {
                    native::WriteValue::Value(value_to_native(value))
                }
                facade::WriteField::Sentinel(sentinel) => {
                    native::WriteValue::FieldValue(field_value_to_native(sentinel))
                }
            };
            (name, write_value)
        })
        .collect()
}

pub fn settings_to_native(settings: facade::FirestoreSettings) -> native::Settings {
    native::Settings {
        host: settings.host,
        persistence_enabled: settings.persistence_enabled,
        ssl_enabled: settings.ssl_enabled,
        cache_size_bytes: settings.cache_size_bytes,
    }
}

pub fn settings_to_facade(settings: native::Settings) -> facade::FirestoreSettings {
    facade::FirestoreSettings {
        host: settings.host,
        persistence_enabled: settings.persistence_enabled,
        ssl_enabled: settings.ssl_enabled,
        cache_size_bytes: settings.cache_size_bytes,
    }
}

pub fn document_change_to_facade(
    change: native::DocumentChange,
) -> FirestoreResult<facade::DocumentChange> {
    let change_type = change_type_to_facade(change.change_type())?;
    Ok(facade::DocumentChange::new(
        Box::new(DocumentSnapshotWrapper::new(change.document().clone())),
        change_type,
        change.old_index(),
        change.new_index(),
    ))
}

pub fn query_snapshot_to_facade(
    snapshot: native::QuerySnapshot,
) -> FirestoreResult<facade::QuerySnapshot> {
    let documents = snapshot
        .documents()
        .iter()
        .map(|document| {
            Box::new(DocumentSnapshotWrapper::new(document.clone()))
                as Box<dyn facade::DocumentSnapshot>
        })
        .collect();
    let changes = snapshot
        .changes()
        .iter()
        .cloned()
        .map(document_change_to_facade)
        .collect::<FirestoreResult<Vec<_>>>()?;
    Ok(facade::QuerySnapshot::new(documents, changes))
}

/// Forwards native error codes unchanged; codes this adapter predates land
/// on `Internal` with the native code preserved in the message.
pub fn error_to_facade(error: native::Error) -> FirestoreError {
    let code = match error.code() {
        native::ErrorCode::InvalidArgument => FirestoreErrorCode::InvalidArgument,
        native::ErrorCode::NotFound => FirestoreErrorCode::NotFound,
        native::ErrorCode::AlreadyExists => FirestoreErrorCode::AlreadyExists,
        native::ErrorCode::Aborted => FirestoreErrorCode::Aborted,
        native::ErrorCode::PermissionDenied => FirestoreErrorCode::PermissionDenied,
        native::ErrorCode::Unavailable => FirestoreErrorCode::Unavailable,
        native::ErrorCode::ResourceExhausted => FirestoreErrorCode::ResourceExhausted,
        native::ErrorCode::Internal => FirestoreErrorCode::Internal,
        other => {
            return FirestoreError::new(
                FirestoreErrorCode::Internal,
                format!("unmapped native error code {other:?}: {}", error.message()),
            )
        }
    };
    FirestoreError::new(code, error.message())
}
