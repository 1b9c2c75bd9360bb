use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use firestore_facade as facade;
use firestore_memstore as native;

use facade::FirestoreResult;

use crate::batch::ListenerRegistrationWrapper;
use crate::collection::CollectionReferenceWrapper;
use crate::convert::{error_to_facade, source_to_native, value_to_facade, write_data_to_native};

/// A native document handle behind the neutral reference contract.
pub struct DocumentReferenceWrapper {
    native: native::DocumentReference,
}

impl DocumentReferenceWrapper {
    pub fn new(native: native::DocumentReference) -> Self {
        Self { native }
    }

    pub fn native(&self) -> &native::DocumentReference {
        &self.native
    }
}

#[async_trait]
impl facade::DocumentReference for DocumentReferenceWrapper {
    fn id(&self) -> String {
        self.native.id().to_string()
    }

    fn path(&self) -> String {
        self.native.path().to_string()
    }

    fn parent(&self) -> FirestoreResult<Box<dyn facade::CollectionReference>> {
        Ok(Box::new(CollectionReferenceWrapper::new(
            self.native.parent(),
        )))
    }

    fn collection(&self, path: &str) -> FirestoreResult<Box<dyn facade::CollectionReference>> {
        let collection = self.native.collection(path).map_err(error_to_facade)?;
        Ok(Box::new(CollectionReferenceWrapper::new(collection)))
    }

    async fn get(&self, source: facade::Source) -> FirestoreResult<Box<dyn facade::DocumentSnapshot>> {
        let snapshot = self
            .native
            .get(source_to_native(source))
            .await
            .map_err(error_to_facade)?;
        Ok(Box::new(DocumentSnapshotWrapper::new(snapshot)))
    }

    async fn set(&self, data: facade::DocumentData) -> FirestoreResult<()> {
        self.native
            .set(write_data_to_native(data))
            .await
            .map_err(error_to_facade)
    }

    async fn update(&self, data: facade::DocumentData) -> FirestoreResult<()> {
        self.native
            .update(write_data_to_native(data))
            .await
            .map_err(error_to_facade)
    }

    async fn delete(&self) -> FirestoreResult<()> {
        self.native.delete().await.map_err(error_to_facade)
    }

    fn listen(
        &self,
        listener: facade::DocumentListener,
    ) -> FirestoreResult<Box<dyn facade::ListenerRegistration>> {
        let registration = self.native.listen(Arc::new(move |snapshot| {
            listener(Box::new(DocumentSnapshotWrapper::new(snapshot)));
        }));
        Ok(Box::new(ListenerRegistrationWrapper::new(registration)))
    }

    fn clone_reference(&self) -> Box<dyn facade::DocumentReference> {
        Box::new(DocumentReferenceWrapper::new(self.native.clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A native snapshot behind the neutral snapshot contract.
pub struct DocumentSnapshotWrapper {
    native: native::DocumentSnapshot,
}

impl DocumentSnapshotWrapper {
    pub fn new(native: native::DocumentSnapshot) -> Self {
        Self { native }
    }

    pub fn native(&self) -> &native::DocumentSnapshot {
        &self.native
    }
}

impl facade::DocumentSnapshot for DocumentSnapshotWrapper {
    fn id(&self) -> String {
        self.native.id().to_string()
    }

    fn exists(&self) -> bool {
        self.native.exists()
    }

    fn data(&self) -> Option<BTreeMap<String, facade::Value>> {
        self.native.data().map(|fields| {
            fields
                .iter()
                .map(|(name, value)| (name.clone(), value_to_facade(value.clone())))
                .collect()
        })
    }

    fn metadata(&self) -> Box<dyn facade::SnapshotMetadata> {
        Box::new(SnapshotMetadataWrapper::new(self.native.metadata()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct SnapshotMetadataWrapper {
    native: native::SnapshotMetadata,
}

impl SnapshotMetadataWrapper {
    pub fn new(native: native::SnapshotMetadata) -> Self {
        Self { native }
    }

    pub fn native(&self) -> native::SnapshotMetadata {
        self.native
    }
}

impl facade::SnapshotMetadata for SnapshotMetadataWrapper {
    fn is_from_cache(&self) -> bool {
        self.native.is_from_cache()
    }

    fn has_pending_writes(&self) -> bool {
        self.native.has_pending_writes()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
