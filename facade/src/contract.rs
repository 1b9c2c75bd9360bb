//! Object-safe traits every platform adapter implements.
//!
//! All trait objects expose `as_any` so an adapter can recover its own
//! concrete wrapper from a neutral handle; a downcast miss means the object
//! came from a different adapter and is rejected with
//! `UnsupportedImplementation`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::changes::QuerySnapshot;
use crate::error::FirestoreResult;
use crate::field_path::FieldPath;
use crate::settings::{FilterOperator, FirestoreSettings, SortDirection, Source};
use crate::snapshot::DocumentSnapshot;
use crate::value::{DocumentData, Value};

/// Callback invoked with every emission of a document listener.
pub type DocumentListener = Arc<dyn Fn(Box<dyn DocumentSnapshot>) + Send + Sync>;

/// Callback invoked with every emission of a query listener.
pub type QueryListener = Arc<dyn Fn(QuerySnapshot) + Send + Sync>;

/// The root handle to a database instance.
#[async_trait]
pub trait Firestore: Send + Sync {
    /// Resolves a slash-separated document path (even segment count).
    fn document(&self, path: &str) -> FirestoreResult<Box<dyn DocumentReference>>;
    /// Resolves a slash-separated collection path (odd segment count).
    fn collection(&self, path: &str) -> FirestoreResult<Box<dyn CollectionReference>>;
    fn settings(&self) -> FirestoreSettings;
    fn apply_settings(&self, settings: FirestoreSettings) -> FirestoreResult<()>;
    /// Runs `updates` against a transaction and commits its buffered writes
    /// atomically. An error from the closure discards the transaction.
    async fn run_transaction(
        &self,
        updates: &(dyn for<'a> Fn(&'a mut (dyn Transaction + 'a)) -> FirestoreResult<()> + Send + Sync),
    ) -> FirestoreResult<()>;
    fn batch(&self) -> Box<dyn WriteBatch>;
    fn as_any(&self) -> &dyn Any;
}

/// A handle to a single document location; the document may not exist.
#[async_trait]
pub trait DocumentReference: Send + Sync {
    fn id(&self) -> String;
    fn path(&self) -> String;
    fn parent(&self) -> FirestoreResult<Box<dyn CollectionReference>>;
    fn collection(&self, path: &str) -> FirestoreResult<Box<dyn CollectionReference>>;
    async fn get(&self, source: Source) -> FirestoreResult<Box<dyn DocumentSnapshot>>;
    /// Replaces the document with `data`, creating it if absent.
    async fn set(&self, data: DocumentData) -> FirestoreResult<()>;
    /// Merges `data` into an existing document; fails with `NotFound` when
    /// the document does not exist.
    async fn update(&self, data: DocumentData) -> FirestoreResult<()>;
    /// Deletes the document. Deleting a missing document is not an error.
    async fn delete(&self) -> FirestoreResult<()>;
    fn listen(&self, listener: DocumentListener) -> FirestoreResult<Box<dyn ListenerRegistration>>;
    fn clone_reference(&self) -> Box<dyn DocumentReference>;
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn DocumentReference + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentReference")
            .field("path", &self.path())
            .finish_non_exhaustive()
    }
}

/// An immutable query description. Builder methods return extended copies.
#[async_trait]
pub trait Query: Send + Sync {
    fn where_field(
        &self,
        path: FieldPath,
        operator: FilterOperator,
        value: Value,
    ) -> FirestoreResult<Box<dyn Query>>;
    fn order_by(
        &self,
        path: FieldPath,
        direction: SortDirection,
    ) -> FirestoreResult<Box<dyn Query>>;
    fn limit(&self, count: u32) -> FirestoreResult<Box<dyn Query>>;
    async fn get(&self, source: Source) -> FirestoreResult<QuerySnapshot>;
    fn listen(&self, listener: QueryListener) -> FirestoreResult<Box<dyn ListenerRegistration>>;
    fn as_any(&self) -> &dyn Any;
}

/// A collection handle; usable directly as a query over its documents.
#[async_trait]
pub trait CollectionReference: Query {
    fn id(&self) -> String;
    fn path(&self) -> String;
    fn document(&self, path: &str) -> FirestoreResult<Box<dyn DocumentReference>>;
    /// A reference to a new document with a generated identifier. The
    /// document is not created until it is written to.
    fn document_auto_id(&self) -> Box<dyn DocumentReference>;
    /// Creates a new document with a generated identifier holding `data`.
    async fn add(&self, data: DocumentData) -> FirestoreResult<Box<dyn DocumentReference>>;
}

impl fmt::Debug for dyn CollectionReference + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionReference")
            .field("path", &self.path())
            .finish_non_exhaustive()
    }
}

/// Reads and buffered writes inside [`Firestore::run_transaction`].
///
/// Reads observe the state the transaction began from; writes are staged and
/// applied atomically when the closure returns successfully.
pub trait Transaction: Send {
    fn get(
        &mut self,
        reference: &dyn DocumentReference,
    ) -> FirestoreResult<Box<dyn DocumentSnapshot>>;
    fn set(&mut self, reference: &dyn DocumentReference, data: DocumentData)
        -> FirestoreResult<()>;
    fn update(
        &mut self,
        reference: &dyn DocumentReference,
        data: DocumentData,
    ) -> FirestoreResult<()>;
    fn delete(&mut self, reference: &dyn DocumentReference) -> FirestoreResult<()>;
    fn as_any(&self) -> &dyn Any;
}

/// A buffer of writes committed in one atomic operation.
#[async_trait]
pub trait WriteBatch: Send {
    fn set(&mut self, reference: &dyn DocumentReference, data: DocumentData)
        -> FirestoreResult<()>;
    fn update(
        &mut self,
        reference: &dyn DocumentReference,
        data: DocumentData,
    ) -> FirestoreResult<()>;
    fn delete(&mut self, reference: &dyn DocumentReference) -> FirestoreResult<()>;
    async fn commit(self: Box<Self>) -> FirestoreResult<()>;
    fn as_any(&self) -> &dyn Any;
}

/// Handle keeping a listener alive. Detaching stops further emissions.
pub trait ListenerRegistration: Send {
    fn detach(&mut self);
}
