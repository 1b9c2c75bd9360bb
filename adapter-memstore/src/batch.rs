use std::any::Any;

use async_trait::async_trait;
use firestore_facade as facade;
use firestore_memstore as native;

use facade::FirestoreResult;

use crate::convert::{error_to_facade, unwrap_document_reference, write_data_to_native};
use crate::document::DocumentSnapshotWrapper;

/// A native transaction behind the neutral transaction contract. References
/// handed to it must come from this adapter.
pub struct TransactionWrapper {
    native: native::Transaction,
}

impl TransactionWrapper {
    pub fn new(native: native::Transaction) -> Self {
        Self { native }
    }

    pub fn native(&self) -> &native::Transaction {
        &self.native
    }

    pub(crate) fn into_native(self) -> native::Transaction {
        self.native
    }
}

impl facade::Transaction for TransactionWrapper {
    fn get(
        &mut self,
        reference: &dyn facade::DocumentReference,
    ) -> FirestoreResult<Box<dyn facade::DocumentSnapshot>> {
        let reference = unwrap_document_reference(reference)?;
        let snapshot = self.native.get(reference).map_err(error_to_facade)?;
        Ok(Box::new(DocumentSnapshotWrapper::new(snapshot)))
    }

    fn set(
        &mut self,
        reference: &dyn facade::DocumentReference,
        data: facade::DocumentData,
    ) -> FirestoreResult<()> {
        let reference = unwrap_document_reference(reference)?;
        self.native
            .set(reference, write_data_to_native(data))
            .map_err(error_to_facade)
    }

    fn update(
        &mut self,
        reference: &dyn facade::DocumentReference,
        data: facade::DocumentData,
    ) -> FirestoreResult<()> {
        let reference = unwrap_document_reference(reference)?;
        self.native
            .update(reference, write_data_to_native(data))
            .map_err(error_to_facade)
    }

    fn delete(&mut self, reference: &dyn facade::DocumentReference) -> FirestoreResult<()> {
        let reference = unwrap_document_reference(reference)?;
        self.native.delete(reference).map_err(error_to_facade)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A native write batch behind the neutral batch contract.
pub struct WriteBatchWrapper {
    native: native::WriteBatch,
}

impl WriteBatchWrapper {
    pub fn new(native: native::WriteBatch) -> Self {
        Self { native }
    }

    pub fn native(&self) -> &native::WriteBatch {
        &self.native
    }
}

#[async_trait]
impl facade::WriteBatch for WriteBatchWrapper {
    fn set(
        &mut self,
        reference: &dyn facade::DocumentReference,
        data: facade::DocumentData,
    ) -> FirestoreResult<()> {
        let reference = unwrap_document_reference(reference)?;
        self.native
            .set(reference, write_data_to_native(data))
            .map_err(error_to_facade)
    }

    fn update(
        &mut self,
        reference: &dyn facade::DocumentReference,
        data: facade::DocumentData,
    ) -> FirestoreResult<()> {
        let reference = unwrap_document_reference(reference)?;
        self.native
            .update(reference, write_data_to_native(data))
            .map_err(error_to_facade)
    }

    fn delete(&mut self, reference: &dyn facade::DocumentReference) -> FirestoreResult<()> {
        let reference = unwrap_document_reference(reference)?;
        self.native.delete(reference).map_err(error_to_facade)
    }

    async fn commit(self: Box<Self>) -> FirestoreResult<()> {
        self.native.commit().await.map_err(error_to_facade)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Keeps a native listener attached for the life of the neutral handle.
pub struct ListenerRegistrationWrapper {
    native: native::ListenerRegistration,
}

impl ListenerRegistrationWrapper {
    pub fn new(native: native::ListenerRegistration) -> Self {
        Self { native }
    }
}

impl facade::ListenerRegistration for ListenerRegistrationWrapper {
    fn detach(&mut self) {
        self.native.detach();
    }
}
