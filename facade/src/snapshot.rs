use std::any::Any;
use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::error::{invalid_argument, FirestoreResult};
use crate::value::Value;

/// Delivery state of a snapshot.
pub trait SnapshotMetadata: Send + Sync {
    fn is_from_cache(&self) -> bool;
    fn has_pending_writes(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
}

/// A point-in-time view of a single document.
pub trait DocumentSnapshot: Send + Sync {
    /// The final path segment identifying the document.
    fn id(&self) -> String;
    fn exists(&self) -> bool;
    /// The document's fields, or `None` when the document does not exist.
    fn data(&self) -> Option<BTreeMap<String, Value>>;
    fn metadata(&self) -> Box<dyn SnapshotMetadata>;
    fn as_any(&self) -> &dyn Any;
}

/// A snapshot paired with a serde target type.
///
/// Decoding goes through the JSON data model, so any `DeserializeOwned` type
/// whose serde representation matches the stored fields will work.
pub struct TypedDocumentSnapshot<T> {
    inner: Box<dyn DocumentSnapshot>,
    target: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> TypedDocumentSnapshot<T> {
    pub fn new(inner: Box<dyn DocumentSnapshot>) -> Self {
        Self {
            inner,
            target: PhantomData,
        }
    }

    pub fn id(&self) -> String {
        self.inner.id()
    }

    pub fn exists(&self) -> bool {
        self.inner.exists()
    }

    pub fn metadata(&self) -> Box<dyn SnapshotMetadata> {
        self.inner.metadata()
    }

    pub fn raw(&self) -> &dyn DocumentSnapshot {
        self.inner.as_ref()
    }

    /// Decodes the document into `T`, or `None` when it does not exist.
    pub fn data(&self) -> FirestoreResult<Option<T>> {
        let Some(fields) = self.inner.data() else {
            return Ok(None);
        };
        let json = serde_json::Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        );
        serde_json::from_value(json).map(Some).map_err(|err| {
            invalid_argument(format!(
                "failed to decode document {}: {err}",
                self.inner.id()
            ))
        })
    }
}
