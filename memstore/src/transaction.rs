use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{invalid_argument, resource_exhausted, Result};
use crate::reference::DocumentReference;
use crate::snapshot::{DocumentSnapshot, SnapshotMetadata};
use crate::store::{StoreInner, WriteOperation};
use crate::value::{Fields, WriteData};

/// Most writes a single batch or transaction may carry.
pub const MAX_BATCH_WRITES: usize = 500;

fn ensure_same_store(store: &Arc<StoreInner>, reference: &DocumentReference) -> Result<()> {
    if Arc::ptr_eq(store, reference.store()) {
        Ok(())
    } else {
        Err(invalid_argument(format!(
            "document {} belongs to a different store",
            reference.path()
        )))
    }
}

fn ensure_capacity(writes: &[WriteOperation]) -> Result<()> {
    if writes.len() >= MAX_BATCH_WRITES {
        return Err(resource_exhausted(format!(
            "cannot buffer more than {MAX_BATCH_WRITES} writes"
        )));
    }
    Ok(())
}

/// Reads over a fixed view of the store plus buffered writes. Created by
/// [`crate::Firestore::begin_transaction`] and applied atomically by
/// [`crate::Firestore::commit_transaction`].
pub struct Transaction {
    store: Arc<StoreInner>,
    view: BTreeMap<String, Fields>,
    writes: Vec<WriteOperation>,
}

impl Transaction {
    pub(crate) fn new(store: Arc<StoreInner>, view: BTreeMap<String, Fields>) -> Self {
        Self {
            store,
            view,
            writes: Vec::new(),
        }
    }

    /// Reads a document as of the transaction's start.
    pub fn get(&self, reference: &DocumentReference) -> Result<DocumentSnapshot> {
        ensure_same_store(&self.store, reference)?;
        Ok(DocumentSnapshot::new(
            reference.path(),
            self.view.get(reference.path()).cloned(),
            SnapshotMetadata::new(true, false),
        ))
    }

    pub fn set(&mut self, reference: &DocumentReference, data: WriteData) -> Result<()> {
        self.buffer(reference, |path| WriteOperation::Set { path, data })
    }

    pub fn update(&mut self, reference: &DocumentReference, data: WriteData) -> Result<()> {
        self.buffer(reference, |path| WriteOperation::Update { path, data })
    }

    pub fn delete(&mut self, reference: &DocumentReference) -> Result<()> {
        self.buffer(reference, |path| WriteOperation::Delete { path })
    }

    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    fn buffer(
        &mut self,
        reference: &DocumentReference,
        operation: impl FnOnce(String) -> WriteOperation,
    ) -> Result<()> {
        ensure_same_store(&self.store, reference)?;
        ensure_capacity(&self.writes)?;
        self.writes.push(operation(reference.path().to_string()));
        Ok(())
    }

    pub(crate) fn into_writes(self, store: &Arc<StoreInner>) -> Result<Vec<WriteOperation>> {
        if !Arc::ptr_eq(store, &self.store) {
            return Err(invalid_argument(
                "transaction was started on a different store",
            ));
        }
        Ok(self.writes)
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("view", &self.view)
            .field("writes", &self.writes)
            .finish_non_exhaustive()
    }
}

/// Buffered writes committed in one atomic operation.
pub struct WriteBatch {
    store: Arc<StoreInner>,
    writes: Vec<WriteOperation>,
}

impl WriteBatch {
    pub(crate) fn new(store: Arc<StoreInner>) -> Self {
        Self {
            store,
            writes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn set(&mut self, reference: &DocumentReference, data: WriteData) -> Result<()> {
        self.buffer(reference, |path| WriteOperation::Set { path, data })
    }

    pub fn update(&mut self, reference: &DocumentReference, data: WriteData) -> Result<()> {
        self.buffer(reference, |path| WriteOperation::Update { path, data })
    }

    pub fn delete(&mut self, reference: &DocumentReference) -> Result<()> {
        self.buffer(reference, |path| WriteOperation::Delete { path })
    }

    /// Applies every buffered write, or none when any of them fails.
    pub async fn commit(self) -> Result<()> {
        log::debug!("committing batch with {} writes", self.writes.len());
        self.store.apply_writes(&self.writes)
    }

    fn buffer(
        &mut self,
        reference: &DocumentReference,
        operation: impl FnOnce(String) -> WriteOperation,
    ) -> Result<()> {
        ensure_same_store(&self.store, reference)?;
        ensure_capacity(&self.writes)?;
        self.writes.push(operation(reference.path().to_string()));
        Ok(())
    }
}

impl fmt::Debug for WriteBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteBatch")
            .field("writes", &self.writes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::settings::Source;
    use crate::store::Firestore;
    use crate::value::{Value, WriteValue};

    fn name_data(name: &str) -> WriteData {
        let mut data = WriteData::new();
        data.insert(
            "name".to_string(),
            WriteValue::Value(Value::String(name.to_string())),
        );
        data
    }

    #[tokio::test]
    async fn transaction_reads_see_the_starting_state() {
        let store = Firestore::new();
        let reference = store.document("users/alice").unwrap();
        reference.set(name_data("Alice")).await.unwrap();

        store
            .run_transaction(|transaction| {
                let snapshot = transaction.get(&reference)?;
                assert_eq!(
                    snapshot.data().unwrap().get("name"),
                    Some(&Value::String("Alice".to_string()))
                );
                transaction.set(&reference, name_data("Alison"))?;
                // Reads still observe the state the transaction began from.
                let snapshot = transaction.get(&reference)?;
                assert_eq!(
                    snapshot.data().unwrap().get("name"),
                    Some(&Value::String("Alice".to_string()))
                );
                Ok(())
            })
            .await
            .unwrap();

        let committed = reference.get(Source::Default).await.unwrap();
        assert_eq!(
            committed.data().unwrap().get("name"),
            Some(&Value::String("Alison".to_string()))
        );
    }

    #[tokio::test]
    async fn failed_transaction_discards_buffered_writes() {
        let store = Firestore::new();
        let reference = store.document("users/alice").unwrap();

        let err = store
            .run_transaction(|transaction| {
                transaction.set(&reference, name_data("Alice"))?;
                Err(crate::error::invalid_argument("abort"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);

        let snapshot = reference.get(Source::Default).await.unwrap();
        assert!(!snapshot.exists());
    }

    #[tokio::test]
    async fn foreign_references_are_rejected() {
        let store = Firestore::new();
        let other = Firestore::new();
        let foreign = other.document("users/alice").unwrap();

        let mut batch = store.batch();
        let err = batch.set(&foreign, WriteData::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn batches_cap_at_five_hundred_writes() {
        let store = Firestore::new();
        let reference = store.document("users/alice").unwrap();
        let mut batch = store.batch();
        for _ in 0..MAX_BATCH_WRITES {
            batch.set(&reference, WriteData::new()).unwrap();
        }
        let err = batch.set(&reference, WriteData::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ResourceExhausted);
    }

    #[tokio::test]
    async fn batch_applies_all_writes_atomically() {
        let store = Firestore::new();
        let alice = store.document("users/alice").unwrap();
        let bob = store.document("users/bob").unwrap();

        let mut batch = store.batch();
        batch.set(&alice, name_data("Alice")).unwrap();
        batch.set(&bob, name_data("Bob")).unwrap();
        batch.commit().await.unwrap();

        assert!(alice.get(Source::Default).await.unwrap().exists());
        assert!(bob.get(Source::Default).await.unwrap().exists());
    }
}
