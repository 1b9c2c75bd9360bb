use serde::de::DeserializeOwned;

use crate::snapshot::{DocumentSnapshot, TypedDocumentSnapshot};

/// How a document moved relative to the previous query snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentChangeType {
    Added,
    Modified,
    Removed,
}

/// A single document's transition between two query snapshots.
///
/// Indices are positions within the snapshot's result ordering; `-1` marks a
/// position that does not exist (old index of an added document, new index of
/// a removed one).
pub struct DocumentChange {
    document: Box<dyn DocumentSnapshot>,
    change_type: DocumentChangeType,
    old_index: i32,
    new_index: i32,
}

impl DocumentChange {
    pub fn new(
        document: Box<dyn DocumentSnapshot>,
        change_type: DocumentChangeType,
        old_index: i32,
        new_index: i32,
    ) -> Self {
        Self {
            document,
            change_type,
            old_index,
            new_index,
        }
    }

    pub fn document(&self) -> &dyn DocumentSnapshot {
        self.document.as_ref()
    }

    pub fn change_type(&self) -> DocumentChangeType {
        self.change_type
    }

    pub fn old_index(&self) -> i32 {
        self.old_index
    }

    pub fn new_index(&self) -> i32 {
        self.new_index
    }

    pub fn into_typed<T: DeserializeOwned>(self) -> TypedDocumentChange<T> {
        TypedDocumentChange {
            document: TypedDocumentSnapshot::new(self.document),
            change_type: self.change_type,
            old_index: self.old_index,
            new_index: self.new_index,
        }
    }
}

/// A [`DocumentChange`] whose document decodes into `T`.
pub struct TypedDocumentChange<T> {
    document: TypedDocumentSnapshot<T>,
    change_type: DocumentChangeType,
    old_index: i32,
    new_index: i32,
}

impl<T: DeserializeOwned> TypedDocumentChange<T> {
    pub fn document(&self) -> &TypedDocumentSnapshot<T> {
        &self.document
    }

    pub fn change_type(&self) -> DocumentChangeType {
        self.change_type
    }

    pub fn old_index(&self) -> i32 {
        self.old_index
    }

    pub fn new_index(&self) -> i32 {
        self.new_index
    }
}

/// The result of a query read or listen emission.
pub struct QuerySnapshot {
    documents: Vec<Box<dyn DocumentSnapshot>>,
    changes: Vec<DocumentChange>,
}

impl QuerySnapshot {
    pub fn new(documents: Vec<Box<dyn DocumentSnapshot>>, changes: Vec<DocumentChange>) -> Self {
        Self { documents, changes }
    }

    pub fn documents(&self) -> &[Box<dyn DocumentSnapshot>] {
        &self.documents
    }

    /// Transitions since the previous emission for the same listener. Empty
    /// for one-shot reads.
    pub fn changes(&self) -> &[DocumentChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Consumes the snapshot, releasing documents and changes for ownership,
    /// e.g. to decode changes via [`DocumentChange::into_typed`].
    pub fn into_parts(self) -> (Vec<Box<dyn DocumentSnapshot>>, Vec<DocumentChange>) {
        (self.documents, self.changes)
    }
}
