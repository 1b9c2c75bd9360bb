use std::fmt;
use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::{invalid_argument, Result};
use crate::query::Query;
use crate::settings::Source;
use crate::snapshot::{DocumentSnapshot, SnapshotMetadata};
use crate::store::{
    DocumentCallback, ListenerRegistration, QueryCallback, StoreInner, WriteOperation,
};
use crate::value::WriteData;

const AUTO_ID_LENGTH: usize = 20;

pub(crate) fn split_path(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Err(invalid_argument("path must not be empty"));
    }
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(invalid_argument(format!(
            "path '{path}' must not contain empty segments"
        )));
    }
    Ok(segments)
}

pub(crate) fn validate_document_path(path: &str) -> Result<()> {
    let segments = split_path(path)?;
    if segments.len() % 2 != 0 {
        return Err(invalid_argument(format!(
            "document path '{path}' must have an even number of segments"
        )));
    }
    Ok(())
}

pub(crate) fn validate_collection_path(path: &str) -> Result<()> {
    let segments = split_path(path)?;
    if segments.len() % 2 != 1 {
        return Err(invalid_argument(format!(
            "collection path '{path}' must have an odd number of segments"
        )));
    }
    Ok(())
}

fn generate_auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// A handle to a single document location in the store.
#[derive(Clone)]
pub struct DocumentReference {
    store: Arc<StoreInner>,
    path: String,
}

impl DocumentReference {
    pub(crate) fn new(store: Arc<StoreInner>, path: String) -> Self {
        Self { store, path }
    }

    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> CollectionReference {
        let parent = match self.path.rsplit_once('/') {
            Some((parent, _)) => parent.to_string(),
            None => String::new(),
        };
        CollectionReference::new(self.store.clone(), parent)
    }

    pub fn collection(&self, path: &str) -> Result<CollectionReference> {
        let segments = split_path(path)?;
        if segments.len() % 2 != 1 {
            return Err(invalid_argument(format!(
                "relative collection path '{path}' must have an odd number of segments"
            )));
        }
        Ok(CollectionReference::new(
            self.store.clone(),
            format!("{}/{path}", self.path),
        ))
    }

    pub async fn get(&self, source: Source) -> Result<DocumentSnapshot> {
        let metadata = SnapshotMetadata::new(false, matches!(source, Source::Cache));
        Ok(self.store.read_document(&self.path, metadata))
    }

    /// Replaces the document with `data`, creating it if absent.
    pub async fn set(&self, data: WriteData) -> Result<()> {
        self.store.apply_writes(&[WriteOperation::Set {
            path: self.path.clone(),
            data,
        }])
    }

    /// Merges `data` into the document; fails when the document is missing.
    pub async fn update(&self, data: WriteData) -> Result<()> {
        self.store.apply_writes(&[WriteOperation::Update {
            path: self.path.clone(),
            data,
        }])
    }

    pub async fn delete(&self) -> Result<()> {
        self.store.apply_writes(&[WriteOperation::Delete {
            path: self.path.clone(),
        }])
    }

    pub fn listen(&self, callback: DocumentCallback) -> ListenerRegistration {
        self.store.listen_document(&self.path, callback)
    }

    pub(crate) fn store(&self) -> &Arc<StoreInner> {
        &self.store
    }
}

impl PartialEq for DocumentReference {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store) && self.path == other.path
    }
}

impl fmt::Debug for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentReference")
            .field("path", &self.path)
            .finish()
    }
}

/// A handle to a collection; doubles as the root of a query over it.
#[derive(Clone)]
pub struct CollectionReference {
    store: Arc<StoreInner>,
    path: String,
}

impl CollectionReference {
    pub(crate) fn new(store: Arc<StoreInner>, path: String) -> Self {
        Self { store, path }
    }

    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn document(&self, path: &str) -> Result<DocumentReference> {
        let segments = split_path(path)?;
        if segments.len() % 2 != 1 {
            return Err(invalid_argument(format!(
                "relative document path '{path}' must have an odd number of segments"
            )));
        }
        Ok(DocumentReference::new(
            self.store.clone(),
            format!("{}/{path}", self.path),
        ))
    }

    /// A reference to a fresh document with a random identifier. Nothing is
    /// written until the reference is.
    pub fn document_auto_id(&self) -> DocumentReference {
        DocumentReference::new(
            self.store.clone(),
            format!("{}/{}", self.path, generate_auto_id()),
        )
    }

    /// Creates a document with a generated identifier holding `data`.
    pub async fn add(&self, data: WriteData) -> Result<DocumentReference> {
        let reference = self.document_auto_id();
        reference.set(data).await?;
        Ok(reference)
    }

    /// The query matching every document directly inside this collection.
    pub fn query(&self) -> Query {
        Query::new(self.store.clone(), self.path.clone())
    }

    pub fn listen(&self, callback: QueryCallback) -> ListenerRegistration {
        self.query().listen(callback)
    }
}

impl PartialEq for CollectionReference {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store) && self.path == other.path
    }
}

impl fmt::Debug for CollectionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionReference")
            .field("path", &self.path)
            .finish()
    }
}
