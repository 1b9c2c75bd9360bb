use crate::value::{value_at, FieldPath, Fields, Value};

/// Delivery state attached to every snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SnapshotMetadata {
    has_pending_writes: bool,
    is_from_cache: bool,
}

impl SnapshotMetadata {
    pub fn new(has_pending_writes: bool, is_from_cache: bool) -> Self {
        Self {
            has_pending_writes,
            is_from_cache,
        }
    }

    pub fn has_pending_writes(&self) -> bool {
        self.has_pending_writes
    }

    pub fn is_from_cache(&self) -> bool {
        self.is_from_cache
    }
}

/// A point-in-time view of a document; `data` is `None` when the document
/// does not exist at its path.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSnapshot {
    path: String,
    data: Option<Fields>,
    metadata: SnapshotMetadata,
}

impl DocumentSnapshot {
    pub fn new(path: impl Into<String>, data: Option<Fields>, metadata: SnapshotMetadata) -> Self {
        Self {
            path: path.into(),
            data,
            metadata,
        }
    }

    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&Fields> {
        self.data.as_ref()
    }

    /// Resolves a field path, treating the key path as the document path.
    pub fn field(&self, path: &FieldPath) -> Option<Value> {
        if path.is_key_path() {
            return Some(Value::String(self.path.clone()));
        }
        value_at(self.data.as_ref()?, path.segments()).cloned()
    }

    pub fn metadata(&self) -> SnapshotMetadata {
        self.metadata
    }
}
