use std::any::Any;

use async_trait::async_trait;
use firestore_facade as facade;
use firestore_memstore as native;

use facade::FirestoreResult;

use crate::batch::ListenerRegistrationWrapper;
use crate::convert::{
    error_to_facade, field_path_to_native, filter_operator_to_native, query_snapshot_to_facade,
    sort_direction_to_native, source_to_native, value_to_native, write_data_to_native,
};
use crate::document::DocumentReferenceWrapper;

fn listen_native_query(
    query: &native::Query,
    listener: facade::QueryListener,
) -> Box<dyn facade::ListenerRegistration> {
    let registration = query.listen(std::sync::Arc::new(move |snapshot| {
        match query_snapshot_to_facade(snapshot) {
            Ok(snapshot) => listener(snapshot),
            // A change kind this adapter predates: skip the emission
            // rather than deliver a partial snapshot.
            Err(err) => log::warn!("dropping query emission: {err}"),
        }
    }));
    Box::new(ListenerRegistrationWrapper::new(registration))
}

async fn get_native_query(
    query: &native::Query,
    source: facade::Source,
) -> FirestoreResult<facade::QuerySnapshot> {
    let snapshot = query
        .get(source_to_native(source))
        .await
        .map_err(error_to_facade)?;
    query_snapshot_to_facade(snapshot)
}

/// A native query behind the neutral query contract.
pub struct QueryWrapper {
    native: native::Query,
}

impl QueryWrapper {
    pub fn new(native: native::Query) -> Self {
        Self { native }
    }

    pub fn native(&self) -> &native::Query {
        &self.native
    }
}

#[async_trait]
impl facade::Query for QueryWrapper {
    fn where_field(
        &self,
        path: facade::FieldPath,
        operator: facade::FilterOperator,
        value: facade::Value,
    ) -> FirestoreResult<Box<dyn facade::Query>> {
        let extended = self.native.where_field(
            field_path_to_native(&path)?,
            filter_operator_to_native(operator),
            value_to_native(value),
        );
        Ok(Box::new(QueryWrapper::new(extended)))
    }

    fn order_by(
        &self,
        path: facade::FieldPath,
        direction: facade::SortDirection,
    ) -> FirestoreResult<Box<dyn facade::Query>> {
        let extended = self
            .native
            .order_by(field_path_to_native(&path)?, sort_direction_to_native(direction));
        Ok(Box::new(QueryWrapper::new(extended)))
    }

    fn limit(&self, count: u32) -> FirestoreResult<Box<dyn facade::Query>> {
        Ok(Box::new(QueryWrapper::new(self.native.limit(count))))
    }

    async fn get(&self, source: facade::Source) -> FirestoreResult<facade::QuerySnapshot> {
        get_native_query(&self.native, source).await
    }

    fn listen(
        &self,
        listener: facade::QueryListener,
    ) -> FirestoreResult<Box<dyn facade::ListenerRegistration>> {
        Ok(listen_native_query(&self.native, listener))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A native collection behind the neutral collection contract. Query methods
/// operate on the collection's root query.
pub struct CollectionReferenceWrapper {
    native: native::CollectionReference,
}

impl CollectionReferenceWrapper {
    pub fn new(native: native::CollectionReference) -> Self {
        Self { native }
    }

    pub fn native(&self) -> &native::CollectionReference {
        &self.native
    }
}

#[async_trait]
impl facade::Query for CollectionReferenceWrapper {
    fn where_field(
        &self,
        path: facade::FieldPath,
        operator: facade::FilterOperator,
        value: facade::Value,
    ) -> FirestoreResult<Box<dyn facade::Query>> {
        let extended = self.native.query().where_field(
            field_path_to_native(&path)?,
            filter_operator_to_native(operator),
            value_to_native(value),
        );
        Ok(Box::new(QueryWrapper::new(extended)))
    }

    fn order_by(
        &self,
        path: facade::FieldPath,
        direction: facade::SortDirection,
    ) -> FirestoreResult<Box<dyn facade::Query>> {
        let extended = self
            .native
            .query()
            .order_by(field_path_to_native(&path)?, sort_direction_to_native(direction));
        Ok(Box::new(QueryWrapper::new(extended)))
    }

    fn limit(&self, count: u32) -> FirestoreResult<Box<dyn facade::Query>> {
        Ok(Box::new(QueryWrapper::new(self.native.query().limit(count))))
    }

    async fn get(&self, source: facade::Source) -> FirestoreResult<facade::QuerySnapshot> {
        get_native_query(&self.native.query(), source).await
    }

    fn listen(
        &self,
        listener: facade::QueryListener,
    ) -> FirestoreResult<Box<dyn facade::ListenerRegistration>> {
        Ok(listen_native_query(&self.native.query(), listener))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[async_trait]
impl facade::CollectionReference for CollectionReferenceWrapper {
    fn id(&self) -> String {
        self.native.id().to_string()
    }

    fn path(&self) -> String {
        self.native.path().to_string()
    }

    fn document(&self, path: &str) -> FirestoreResult<Box<dyn facade::DocumentReference>> {
        let reference = self.native.document(path).map_err(error_to_facade)?;
        Ok(Box::new(DocumentReferenceWrapper::new(reference)))
    }

    fn document_auto_id(&self) -> Box<dyn facade::DocumentReference> {
        Box::new(DocumentReferenceWrapper::new(self.native.document_auto_id()))
    }

    async fn add(
        &self,
        data: facade::DocumentData,
    ) -> FirestoreResult<Box<dyn facade::DocumentReference>> {
        let reference = self
            .native
            .add(write_data_to_native(data))
            .await
            .map_err(error_to_facade)?;
        Ok(Box::new(DocumentReferenceWrapper::new(reference)))
    }
}
