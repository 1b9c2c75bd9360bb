//! An embedded, in-memory document store shaped like a native Firestore SDK:
//! slash-separated document paths, write sentinels, queries with filters and
//! ordering, snapshot listeners, transactions, and write batches.
//!
//! Everything lives in process memory behind one shared handle; persistence
//! and networking settings are accepted for surface compatibility but only
//! validated, never acted on.

pub mod error;
pub mod query;
pub mod reference;
pub mod settings;
pub mod snapshot;
pub mod store;
pub mod transaction;
pub mod value;

pub use error::{Error, ErrorCode, Result};
pub use query::{DocumentChange, DocumentChangeType, Query, QuerySnapshot};
pub use reference::{CollectionReference, DocumentReference};
pub use settings::{FilterOperator, Settings, SortDirection, Source, CACHE_SIZE_UNLIMITED};
pub use snapshot::{DocumentSnapshot, SnapshotMetadata};
pub use store::{DocumentCallback, Firestore, ListenerRegistration, QueryCallback};
pub use transaction::{Transaction, WriteBatch, MAX_BATCH_WRITES};
pub use value::{FieldPath, FieldValue, Fields, Value, WriteData, WriteValue, DOCUMENT_ID_FIELD};
