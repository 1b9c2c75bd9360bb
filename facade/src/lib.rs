//! Platform-neutral contract for Firestore-style document databases.
//!
//! Application code programs against the traits and value types in this
//! crate; a per-platform adapter crate wraps the native SDK behind them and
//! converts values at the boundary. The contract is intentionally a shared
//! subset: anything only one platform can do stays out.

pub mod changes;
pub mod contract;
pub mod error;
pub mod field_path;
pub mod field_value;
pub mod settings;
pub mod snapshot;
pub mod value;

pub use changes::{DocumentChange, DocumentChangeType, QuerySnapshot, TypedDocumentChange};
pub use contract::{
    CollectionReference, DocumentListener, DocumentReference, Firestore, ListenerRegistration,
    Query, QueryListener, Transaction, WriteBatch,
};
pub use error::{FirestoreError, FirestoreErrorCode, FirestoreResult};
pub use field_path::FieldPath;
pub use field_value::FieldValue;
pub use settings::{
    FilterOperator, FirestoreSettings, SortDirection, Source, CACHE_SIZE_UNLIMITED,
};
pub use snapshot::{DocumentSnapshot, SnapshotMetadata, TypedDocumentSnapshot};
pub use value::{DocumentData, Value, WriteField};
