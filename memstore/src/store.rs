use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use crate::error::{not_found, Result};
use crate::query::{compute_changes, run_query, QueryDefinition, QuerySnapshot};
use crate::reference::{
    validate_collection_path, validate_document_path, CollectionReference, DocumentReference,
};
use crate::settings::Settings;
use crate::snapshot::{DocumentSnapshot, SnapshotMetadata};
use crate::transaction::{Transaction, WriteBatch};
use crate::value::{FieldValue, Fields, Value, WriteData, WriteValue};

/// Callback for document listeners.
pub type DocumentCallback = Arc<dyn Fn(DocumentSnapshot) + Send + Sync>;

/// Callback for query listeners.
pub type QueryCallback = Arc<dyn Fn(QuerySnapshot) + Send + Sync>;

/// The root handle to an in-memory store. Cloning is cheap and every clone
/// addresses the same documents.
#[derive(Clone)]
pub struct Firestore {
    inner: Arc<StoreInner>,
}

impl Firestore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner::new()),
        }
    }

    pub fn document(&self, path: &str) -> Result<DocumentReference> {
        validate_document_path(path)?;
        Ok(DocumentReference::new(self.inner.clone(), path.to_string()))
    }

    pub fn collection(&self, path: &str) -> Result<CollectionReference> {
        validate_collection_path(path)?;
        Ok(CollectionReference::new(self.inner.clone(), path.to_string()))
    }

    pub fn settings(&self) -> Settings {
        self.inner.lock_settings().clone()
    }

    pub fn apply_settings(&self, settings: Settings) -> Result<()> {
        settings.validate()?;
        *self.inner.lock_settings() = settings;
        Ok(())
    }

    pub fn batch(&self) -> WriteBatch {
        WriteBatch::new(self.inner.clone())
    }

    /// Starts a transaction whose reads observe the store as of this call.
    pub fn begin_transaction(&self) -> Transaction {
        let view = self.inner.lock_state().documents.clone();
        Transaction::new(self.inner.clone(), view)
    }

    /// Applies a transaction's buffered writes atomically.
    pub async fn commit_transaction(&self, transaction: Transaction) -> Result<()> {
        let writes = transaction.into_writes(&self.inner)?;
        log::debug!("committing transaction with {} writes", writes.len());
        self.inner.apply_writes(&writes)
    }

    /// Runs `updates` against a fresh transaction and commits it when the
    /// closure succeeds.
    pub async fn run_transaction<F>(&self, mut updates: F) -> Result<()>
    where
        F: FnMut(&mut Transaction) -> Result<()>,
    {
        let mut transaction = self.begin_transaction();
        updates(&mut transaction)?;
        self.commit_transaction(transaction).await
    }
}

impl Default for Firestore {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Firestore {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Firestore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Firestore")
            .field("documents", &self.inner.lock_state().documents.len())
            .finish()
    }
}

/// A single buffered mutation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum WriteOperation {
    Set { path: String, data: WriteData },
    Update { path: String, data: WriteData },
    Delete { path: String },
}

impl WriteOperation {
    pub(crate) fn path(&self) -> &str {
        match self {
            WriteOperation::Set { path, .. }
            | WriteOperation::Update { path, .. }
            | WriteOperation::Delete { path } => path,
        }
    }
}

pub(crate) struct StoreInner {
    state: Mutex<StoreState>,
    settings: Mutex<Settings>,
    next_listener_id: AtomicU64,
}

#[derive(Default)]
struct StoreState {
    documents: BTreeMap<String, Fields>,
    document_listeners: Vec<DocumentListenerEntry>,
    query_listeners: Vec<QueryListenerEntry>,
}

struct DocumentListenerEntry {
    id: u64,
    path: String,
    callback: DocumentCallback,
}

struct QueryListenerEntry {
    id: u64,
    definition: QueryDefinition,
    callback: QueryCallback,
    last_documents: Vec<DocumentSnapshot>,
}

enum Emission {
    Document(DocumentCallback, DocumentSnapshot),
    Query(QueryCallback, QuerySnapshot),
}

impl StoreInner {
    fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            settings: Mutex::new(Settings::default()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_settings(&self) -> MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn read_document(&self, path: &str, metadata: SnapshotMetadata) -> DocumentSnapshot {
        let state = self.lock_state();
        DocumentSnapshot::new(path, state.documents.get(path).cloned(), metadata)
    }

    pub(crate) fn execute_query(
        &self,
        definition: &QueryDefinition,
        metadata: SnapshotMetadata,
    ) -> Vec<DocumentSnapshot> {
        let state = self.lock_state();
        run_query(&state.documents, definition, metadata)
    }

    /// Applies all writes atomically, then notifies affected listeners.
    /// Either every write lands or none does; callbacks run after the state
    /// lock is released.
    pub(crate) fn apply_writes(&self, writes: &[WriteOperation]) -> Result<()> {
        let emissions = {
            let mut state = self.lock_state();
            let mut staged = state.documents.clone();
            for write in writes {
                apply_write(&mut staged, write)?;
            }
            let changed: BTreeSet<String> =
                writes.iter().map(|write| write.path().to_string()).collect();
            state.documents = staged;
            collect_emissions(&mut state, &changed)
        };

        for emission in emissions {
            match emission {
                Emission::Document(callback, snapshot) => callback(snapshot),
                Emission::Query(callback, snapshot) => callback(snapshot),
            }
        }
        Ok(())
    }

    /// Registers a document listener and synchronously emits the current
    /// snapshot to it.
    pub(crate) fn listen_document(
        self: &Arc<Self>,
        path: &str,
        callback: DocumentCallback,
    ) -> ListenerRegistration {
        let id = self.next_listener_id.fetch_add(1, AtomicOrdering::Relaxed);
        let initial = {
            let mut state = self.lock_state();
            let snapshot = DocumentSnapshot::new(
                path,
                state.documents.get(path).cloned(),
                SnapshotMetadata::default(),
            );
            state.document_listeners.push(DocumentListenerEntry {
                id,
                path: path.to_string(),
                callback: callback.clone(),
            });
            snapshot
        };
        callback(initial);
        ListenerRegistration::new(self.clone(), id)
    }

    /// Registers a query listener and synchronously emits the current result
    /// set to it, with every document reported as added.
    pub(crate) fn listen_query(
        self: &Arc<Self>,
        definition: QueryDefinition,
        callback: QueryCallback,
    ) -> ListenerRegistration {
        let id = self.next_listener_id.fetch_add(1, AtomicOrdering::Relaxed);
        let initial = {
            let mut state = self.lock_state();
            let documents = run_query(&state.documents, &definition, SnapshotMetadata::default());
            let changes = compute_changes(&[], &documents);
            state.query_listeners.push(QueryListenerEntry {
                id,
                definition,
                callback: callback.clone(),
                last_documents: documents.clone(),
            });
            QuerySnapshot::new(documents, changes)
        };
        callback(initial);
        ListenerRegistration::new(self.clone(), id)
    }

    fn remove_listener(&self, id: u64) {
        let mut state = self.lock_state();
        state.document_listeners.retain(|entry| entry.id != id);
        state.query_listeners.retain(|entry| entry.id != id);
    }
}

fn collect_emissions(state: &mut StoreState, changed: &BTreeSet<String>) -> Vec<Emission> {
    let mut emissions = Vec::new();

    for entry in &state.document_listeners {
        if changed.contains(&entry.path) {
            let snapshot = DocumentSnapshot::new(
                entry.path.as_str(),
                state.documents.get(&entry.path).cloned(),
                SnapshotMetadata::default(),
            );
            emissions.push(Emission::Document(entry.callback.clone(), snapshot));
        }
    }

    for entry in &mut state.query_listeners {
        let next = run_query(&state.documents, &entry.definition, SnapshotMetadata::default());
        let changes = compute_changes(&entry.last_documents, &next);
        entry.last_documents = next.clone();
        if !changes.is_empty() {
            emissions.push(Emission::Query(
                entry.callback.clone(),
                QuerySnapshot::new(next, changes),
            ));
        }
    }

    emissions
}

fn apply_write(documents: &mut BTreeMap<String, Fields>, write: &WriteOperation) -> Result<()> {
    match write {
        WriteOperation::Set { path, data } => {
            let mut fields = Fields::new();
            apply_write_data(&mut fields, data);
            documents.insert(path.clone(), fields);
        }
        WriteOperation::Update { path, data } => {
            let mut fields = documents
                .get(path)
                .cloned()
                .ok_or_else(|| not_found(format!("no document to update at {path}")))?;
            apply_write_data(&mut fields, data);
            documents.insert(path.clone(), fields);
        }
        WriteOperation::Delete { path } => {
            documents.remove(path);
        }
    }
    Ok(())
}

fn apply_write_data(fields: &mut Fields, data: &WriteData) {
    for (name, write_value) in data {
        match write_value {
            WriteValue::Value(value) => {
                fields.insert(name.clone(), value.clone());
            }
            WriteValue::FieldValue(transform) => apply_transform(fields, name, transform),
        }
    }
}

fn apply_transform(fields: &mut Fields, name: &str, transform: &FieldValue) {
    let current = fields.get(name).cloned();
    match transform {
        FieldValue::ArrayUnion(elements) => {
            fields.insert(name.to_string(), array_union(current, elements));
        }
        FieldValue::ArrayRemove(elements) => {
            fields.insert(name.to_string(), array_remove(current, elements));
        }
        FieldValue::IncrementInteger(delta) => {
            fields.insert(name.to_string(), increment_integer(current, *delta));
        }
        FieldValue::IncrementDouble(delta) => {
            fields.insert(name.to_string(), increment_double(current, *delta));
        }
        FieldValue::Delete => {
            fields.remove(name);
        }
        FieldValue::ServerTimestamp => {
            fields.insert(name.to_string(), Value::Timestamp(Utc::now()));
        }
    }
}

fn array_union(existing: Option<Value>, additions: &[Value]) -> Value {
    let mut values = match existing {
        Some(Value::Array(values)) => values,
        _ => Vec::new(),
    };
    for element in additions {
        if !values.iter().any(|candidate| candidate == element) {
            values.push(element.clone());
        }
    }
    Value::Array(values)
}

fn array_remove(existing: Option<Value>, removals: &[Value]) -> Value {
    let values = match existing {
        Some(Value::Array(values)) => values,
        _ => Vec::new(),
    };
    Value::Array(
        values
            .into_iter()
            .filter(|candidate| !removals.iter().any(|needle| needle == candidate))
            .collect(),
    )
}

fn increment_integer(existing: Option<Value>, delta: i64) -> Value {
    match existing {
        Some(Value::Integer(current)) => match current.checked_add(delta) {
            Some(sum) => Value::Integer(sum),
            // Overflow promotes to double, like the hosted backend.
            None => Value::Double(current as f64 + delta as f64),
        },
        Some(Value::Double(current)) => Value::Double(current + delta as f64),
        _ => Value::Integer(delta),
    }
}

fn increment_double(existing: Option<Value>, delta: f64) -> Value {
    match existing {
        Some(Value::Integer(current)) => Value::Double(current as f64 + delta),
        Some(Value::Double(current)) => Value::Double(current + delta),
        _ => Value::Double(delta),
    }
}

/// Keeps a listener attached; detaching (or dropping) stops emissions.
pub struct ListenerRegistration {
    store: Arc<StoreInner>,
    id: u64,
    attached: bool,
}

impl ListenerRegistration {
    fn new(store: Arc<StoreInner>, id: u64) -> Self {
        Self {
            store,
            id,
            attached: true,
        }
    }

    pub fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            self.store.remove_listener(self.id);
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn write_value(value: Value) -> WriteValue {
        WriteValue::Value(value)
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = Firestore::new();
        let reference = store.document("users/alice").unwrap();
        let mut data = WriteData::new();
        data.insert("name".to_string(), write_value(Value::String("Alice".into())));
        reference.set(data).await.unwrap();

        let snapshot = reference.get(crate::settings::Source::Default).await.unwrap();
        assert!(snapshot.exists());
        assert_eq!(
            snapshot.data().unwrap().get("name"),
            Some(&Value::String("Alice".to_string()))
        );
    }

    #[tokio::test]
    async fn update_requires_an_existing_document() {
        let store = Firestore::new();
        let reference = store.document("users/ghost").unwrap();
        let mut data = WriteData::new();
        data.insert("name".to_string(), write_value(Value::Null));

        let err = reference.update(data).await.unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = Firestore::new();
        let reference = store.document("users/alice").unwrap();
        reference.delete().await.unwrap();
        reference.set(WriteData::new()).await.unwrap();
        reference.delete().await.unwrap();
        reference.delete().await.unwrap();

        let snapshot = reference.get(crate::settings::Source::Default).await.unwrap();
        assert!(!snapshot.exists());
    }

    #[tokio::test]
    async fn array_union_appends_without_duplicates() {
        let store = Firestore::new();
        let reference = store.document("games/chess").unwrap();
        let mut data = WriteData::new();
        data.insert(
            "tags".to_string(),
            write_value(Value::Array(vec![Value::Integer(1), Value::Integer(2)])),
        );
        reference.set(data).await.unwrap();

        let mut update = WriteData::new();
        update.insert(
            "tags".to_string(),
            WriteValue::FieldValue(FieldValue::ArrayUnion(vec![
                Value::Integer(2),
                Value::Integer(3),
            ])),
        );
        reference.update(update).await.unwrap();

        let snapshot = reference.get(crate::settings::Source::Default).await.unwrap();
        assert_eq!(
            snapshot.data().unwrap().get("tags"),
            Some(&Value::Array(vec![
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(3)
            ]))
        );
    }

    #[tokio::test]
    async fn array_remove_filters_every_occurrence() {
        let store = Firestore::new();
        let reference = store.document("games/chess").unwrap();
        let mut data = WriteData::new();
        data.insert(
            "tags".to_string(),
            write_value(Value::Array(vec![
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(1),
            ])),
        );
        reference.set(data).await.unwrap();

        let mut update = WriteData::new();
        update.insert(
            "tags".to_string(),
            WriteValue::FieldValue(FieldValue::ArrayRemove(vec![Value::Integer(1)])),
        );
        reference.update(update).await.unwrap();

        let snapshot = reference.get(crate::settings::Source::Default).await.unwrap();
        assert_eq!(
            snapshot.data().unwrap().get("tags"),
            Some(&Value::Array(vec![Value::Integer(2)]))
        );
    }

    #[tokio::test]
    async fn integer_increment_promotes_to_double_against_a_double() {
        let store = Firestore::new();
        let reference = store.document("stats/global").unwrap();
        let mut data = WriteData::new();
        data.insert("count".to_string(), write_value(Value::Integer(5)));
        data.insert("score".to_string(), write_value(Value::Double(1.5)));
        reference.set(data).await.unwrap();

        let mut update = WriteData::new();
        update.insert(
            "count".to_string(),
            WriteValue::FieldValue(FieldValue::IncrementInteger(3)),
        );
        update.insert(
            "score".to_string(),
            WriteValue::FieldValue(FieldValue::IncrementDouble(0.5)),
        );
        reference.update(update).await.unwrap();

        let snapshot = reference.get(crate::settings::Source::Default).await.unwrap();
        let fields = snapshot.data().unwrap();
        assert_eq!(fields.get("count"), Some(&Value::Integer(8)));
        assert_eq!(fields.get("score"), Some(&Value::Double(2.0)));
    }

    #[tokio::test]
    async fn increment_on_a_missing_field_writes_the_operand() {
        let store = Firestore::new();
        let reference = store.document("stats/global").unwrap();
        reference.set(WriteData::new()).await.unwrap();

        let mut update = WriteData::new();
        update.insert(
            "count".to_string(),
            WriteValue::FieldValue(FieldValue::IncrementInteger(7)),
        );
        reference.update(update).await.unwrap();

        let snapshot = reference.get(crate::settings::Source::Default).await.unwrap();
        assert_eq!(snapshot.data().unwrap().get("count"), Some(&Value::Integer(7)));
    }

    #[tokio::test]
    async fn delete_sentinel_removes_the_field() {
        let store = Firestore::new();
        let reference = store.document("users/alice").unwrap();
        let mut data = WriteData::new();
        data.insert("name".to_string(), write_value(Value::String("Alice".into())));
        data.insert("nickname".to_string(), write_value(Value::String("Al".into())));
        reference.set(data).await.unwrap();

        let mut update = WriteData::new();
        update.insert("nickname".to_string(), WriteValue::FieldValue(FieldValue::Delete));
        reference.update(update).await.unwrap();

        let snapshot = reference.get(crate::settings::Source::Default).await.unwrap();
        let fields = snapshot.data().unwrap();
        assert!(fields.contains_key("name"));
        assert!(!fields.contains_key("nickname"));
    }

    #[tokio::test]
    async fn server_timestamp_writes_a_timestamp() {
        let store = Firestore::new();
        let reference = store.document("users/alice").unwrap();
        let mut data = WriteData::new();
        data.insert(
            "updated_at".to_string(),
            WriteValue::FieldValue(FieldValue::ServerTimestamp),
        );
        reference.set(data).await.unwrap();

        let snapshot = reference.get(crate::settings::Source::Default).await.unwrap();
        assert!(matches!(
            snapshot.data().unwrap().get("updated_at"),
            Some(Value::Timestamp(_))
        ));
    }

    #[tokio::test]
    async fn cache_reads_are_flagged_in_metadata() {
        let store = Firestore::new();
        let reference = store.document("users/alice").unwrap();
        reference.set(WriteData::new()).await.unwrap();

        let server = reference.get(crate::settings::Source::Server).await.unwrap();
        assert!(!server.metadata().is_from_cache());
        let cache = reference.get(crate::settings::Source::Cache).await.unwrap();
        assert!(cache.metadata().is_from_cache());
    }

    #[tokio::test]
    async fn document_listener_sees_initial_state_and_later_writes() {
        let store = Firestore::new();
        let reference = store.document("users/alice").unwrap();
        let seen: Arc<StdMutex<Vec<bool>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();

        let mut registration = reference.listen(Arc::new(move |snapshot| {
            sink.lock().unwrap().push(snapshot.exists());
        }));

        reference.set(WriteData::new()).await.unwrap();
        reference.delete().await.unwrap();

        assert_eq!(seen.lock().unwrap().as_slice(), &[false, true, false]);

        registration.detach();
        reference.set(WriteData::new()).await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn dropping_a_registration_detaches_the_listener() {
        let store = Firestore::new();
        let reference = store.document("users/alice").unwrap();
        let seen: Arc<StdMutex<usize>> = Arc::new(StdMutex::new(0));
        let sink = seen.clone();

        {
            let _registration = reference.listen(Arc::new(move |_| {
                *sink.lock().unwrap() += 1;
            }));
        }

        reference.set(WriteData::new()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_batch_leaves_the_store_untouched() {
        let store = Firestore::new();
        let alice = store.document("users/alice").unwrap();
        let ghost = store.document("users/ghost").unwrap();

        let mut batch = store.batch();
        let mut data = WriteData::new();
        data.insert("name".to_string(), write_value(Value::String("Alice".into())));
        batch.set(&alice, data).unwrap();
        let mut update = WriteData::new();
        update.insert("name".to_string(), write_value(Value::Null));
        batch.update(&ghost, update).unwrap();

        let err = batch.commit().await.unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::NotFound);

        let snapshot = alice.get(crate::settings::Source::Default).await.unwrap();
        assert!(!snapshot.exists());
    }

    #[test]
    fn apply_settings_rejects_an_empty_host() {
        let store = Firestore::new();
        let mut settings = store.settings();
        settings.host.clear();
        assert!(store.apply_settings(settings).is_err());
        assert_eq!(store.settings().host, "memstore.local");
    }
}
