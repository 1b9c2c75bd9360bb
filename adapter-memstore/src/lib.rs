//! Adapter binding the in-memory store to the platform-neutral Firestore
//! contract.
//!
//! Each neutral interface gets one wrapper struct delegating to the native
//! type, plus a pair of conversion directions: `wrap_*` to cross into the
//! neutral model and `unwrap_*` to recover the native object from a neutral
//! handle. Unwrapping an object another adapter produced fails with
//! `UnsupportedImplementation` instead of panicking.

pub mod batch;
pub mod collection;
pub mod convert;
pub mod database;
pub mod document;

pub use batch::{ListenerRegistrationWrapper, TransactionWrapper, WriteBatchWrapper};
pub use collection::{CollectionReferenceWrapper, QueryWrapper};
pub use convert::{
    unwrap_collection_reference, unwrap_document_reference, unwrap_document_snapshot,
    unwrap_firestore, unwrap_query, unwrap_snapshot_metadata, unwrap_transaction,
    unwrap_write_batch, wrap_firestore,
};
pub use database::FirestoreWrapper;
pub use document::{DocumentReferenceWrapper, DocumentSnapshotWrapper, SnapshotMetadataWrapper};
