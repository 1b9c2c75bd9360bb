use std::any::Any;

use async_trait::async_trait;
use firestore_facade as facade;
use firestore_memstore as native;

use facade::FirestoreResult;

use crate::batch::{TransactionWrapper, WriteBatchWrapper};
use crate::collection::CollectionReferenceWrapper;
use crate::convert::{error_to_facade, settings_to_facade, settings_to_native};
use crate::document::DocumentReferenceWrapper;

/// The native store behind the neutral [`facade::Firestore`] contract.
pub struct FirestoreWrapper {
    native: native::Firestore,
}

impl FirestoreWrapper {
    pub fn new(native: native::Firestore) -> Self {
        Self { native }
    }

    pub fn native(&self) -> &native::Firestore {
        &self.native
    }
}

#[async_trait]
impl facade::Firestore for FirestoreWrapper {
    fn document(&self, path: &str) -> FirestoreResult<Box<dyn facade::DocumentReference>> {
        let reference = self.native.document(path).map_err(error_to_facade)?;
        Ok(Box::new(DocumentReferenceWrapper::new(reference)))
    }

    fn collection(&self, path: &str) -> FirestoreResult<Box<dyn facade::CollectionReference>> {
        let collection = self.native.collection(path).map_err(error_to_facade)?;
        Ok(Box::new(CollectionReferenceWrapper::new(collection)))
    }

    fn settings(&self) -> facade::FirestoreSettings {
        settings_to_facade(self.native.settings())
    }

    fn apply_settings(&self, settings: facade::FirestoreSettings) -> FirestoreResult<()> {
        self.native
            .apply_settings(settings_to_native(settings))
            .map_err(error_to_facade)
    }

    async fn run_transaction(
        &self,
        updates: &(dyn for<'a> Fn(&'a mut (dyn facade::Transaction + 'a)) -> FirestoreResult<()>
              + Send
              + Sync),
    ) -> FirestoreResult<()> {
        let transaction = self.native.begin_transaction();
        let mut wrapper = TransactionWrapper::new(transaction);
        updates(&mut wrapper)?;
        self.native
            .commit_transaction(wrapper.into_native())
            .await
            .map_err(error_to_facade)
    }

    fn batch(&self) -> Box<dyn facade::WriteBatch> {
        Box::new(WriteBatchWrapper::new(self.native.batch()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
