//! Exercises the whole neutral contract end to end against the in-memory
//! store: application code here only sees `firestore_facade` types.

use std::sync::{Arc, Mutex};

use firestore_facade as facade;
use firestore_memstore as native;
use firestore_memstore_adapter::wrap_firestore;

use facade::{
    DocumentChangeType, DocumentData, FieldPath, FieldValue, FilterOperator, FirestoreErrorCode,
    SortDirection, Source, TypedDocumentSnapshot, Value, WriteField,
};
use serde::Deserialize;

fn facade_store() -> Box<dyn facade::Firestore> {
    wrap_firestore(native::Firestore::new())
}

fn person(name: &str, age: i64) -> DocumentData {
    let mut data = DocumentData::new();
    data.insert("name".to_string(), WriteField::Value(Value::from_text(name)));
    data.insert("age".to_string(), WriteField::Value(Value::Integer(age)));
    data
}

#[derive(Debug, Deserialize, PartialEq)]
struct Person {
    name: String,
    age: i64,
}

#[tokio::test]
async fn set_get_and_typed_decode() {
    let store = facade_store();
    let reference = store.document("users/alice").unwrap();
    reference.set(person("Alice", 36)).await.unwrap();

    let snapshot = reference.get(Source::Default).await.unwrap();
    assert!(snapshot.exists());
    assert_eq!(snapshot.id(), "alice");

    let typed = TypedDocumentSnapshot::<Person>::new(snapshot);
    assert_eq!(
        typed.data().unwrap(),
        Some(Person {
            name: "Alice".to_string(),
            age: 36
        })
    );
}

#[tokio::test]
async fn update_missing_document_reports_not_found() {
    let store = facade_store();
    let reference = store.document("users/ghost").unwrap();
    let err = reference.update(person("Ghost", 0)).await.unwrap_err();
    assert_eq!(err.code(), FirestoreErrorCode::NotFound);
}

#[tokio::test]
async fn delete_is_idempotent_through_the_facade() {
    let store = facade_store();
    let reference = store.document("users/alice").unwrap();
    reference.set(person("Alice", 36)).await.unwrap();
    reference.delete().await.unwrap();
    reference.delete().await.unwrap();
    assert!(!reference.get(Source::Default).await.unwrap().exists());
}

#[tokio::test]
async fn sentinels_apply_through_the_facade() {
    let store = facade_store();
    let reference = store.document("stats/global").unwrap();

    let mut data = DocumentData::new();
    data.insert("count".to_string(), WriteField::Value(Value::Integer(5)));
    data.insert(
        "tags".to_string(),
        WriteField::Value(Value::Array(vec![Value::Integer(1)])),
    );
    reference.set(data).await.unwrap();

    let mut update = DocumentData::new();
    // 2.9 truncates to an integer increment of 2.
    update.insert(
        "count".to_string(),
        WriteField::Sentinel(FieldValue::IntegerIncrement(2.9)),
    );
    update.insert(
        "tags".to_string(),
        WriteField::Sentinel(FieldValue::array_union([
            Value::Integer(1),
            Value::Integer(2),
        ])),
    );
    update.insert(
        "updated_at".to_string(),
        WriteField::Sentinel(FieldValue::ServerTimestamp),
    );
    reference.update(update).await.unwrap();

    let snapshot = reference.get(Source::Default).await.unwrap();
    let fields = snapshot.data().unwrap();
    assert_eq!(fields.get("count"), Some(&Value::Integer(7)));
    assert_eq!(
        fields.get("tags"),
        Some(&Value::Array(vec![Value::Integer(1), Value::Integer(2)]))
    );
    assert!(matches!(fields.get("updated_at"), Some(Value::Timestamp(_))));
}

#[tokio::test]
async fn queries_filter_order_and_limit() {
    let store = facade_store();
    let collection = store.collection("users").unwrap();
    for (id, name, age) in [
        ("alice", "Alice", 36),
        ("bob", "Bob", 25),
        ("carol", "Carol", 41),
        ("dave", "Dave", 19),
    ] {
        collection
            .document(id)
            .unwrap()
            .set(person(name, age))
            .await
            .unwrap();
    }

    let snapshot = collection
        .where_field(
            FieldPath::from_dot_separated("age").unwrap(),
            FilterOperator::GreaterThanOrEqual,
            Value::Integer(25),
        )
        .unwrap()
        .order_by(
            FieldPath::from_dot_separated("age").unwrap(),
            SortDirection::Descending,
        )
        .unwrap()
        .limit(2)
        .unwrap()
        .get(Source::Default)
        .await
        .unwrap();

    let ids: Vec<String> = snapshot
        .documents()
        .iter()
        .map(|document| document.id())
        .collect();
    assert_eq!(ids, ["carol", "alice"]);
    assert!(snapshot.changes().is_empty());
}

#[tokio::test]
async fn cache_source_marks_snapshots_as_cached() {
    let store = facade_store();
    let reference = store.document("users/alice").unwrap();
    reference.set(person("Alice", 36)).await.unwrap();

    let cached = reference.get(Source::Cache).await.unwrap();
    assert!(cached.metadata().is_from_cache());
    let served = reference.get(Source::Server).await.unwrap();
    assert!(!served.metadata().is_from_cache());
}

#[tokio::test]
async fn document_listener_tracks_existence() {
    let store = facade_store();
    let reference = store.document("users/alice").unwrap();
    let seen: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let mut registration = reference
        .listen(Arc::new(move |snapshot| {
            sink.lock().unwrap().push(snapshot.exists());
        }))
        .unwrap();

    reference.set(person("Alice", 36)).await.unwrap();
    reference.delete().await.unwrap();
    registration.detach();
    reference.set(person("Alice", 36)).await.unwrap();

    assert_eq!(seen.lock().unwrap().as_slice(), &[false, true, false]);
}

#[tokio::test]
async fn query_listener_reports_typed_changes_with_indices() {
    let store = facade_store();
    let collection = store.collection("users").unwrap();
    collection
        .document("alice")
        .unwrap()
        .set(person("Alice", 36))
        .await
        .unwrap();

    type ChangeRecord = (DocumentChangeType, i32, i32, String, String);
    let seen: Arc<Mutex<Vec<ChangeRecord>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let _registration = collection
        .listen(Arc::new(move |snapshot| {
            let (_, changes) = snapshot.into_parts();
            let mut seen = sink.lock().unwrap();
            for change in changes {
                let change_type = change.change_type();
                let (old_index, new_index) = (change.old_index(), change.new_index());
                let typed = change.into_typed::<Person>();
                let name = typed
                    .document()
                    .data()
                    .ok()
                    .flatten()
                    .map(|person| person.name)
                    .unwrap_or_default();
                seen.push((change_type, old_index, new_index, typed.document().id(), name));
            }
        }))
        .unwrap();

    collection
        .document("bob")
        .unwrap()
        .set(person("Bob", 25))
        .await
        .unwrap();
    collection.document("bob").unwrap().delete().await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen.as_slice(),
        &[
            (DocumentChangeType::Added, -1, 0, "alice".to_string(), "Alice".to_string()),
            (DocumentChangeType::Added, -1, 1, "bob".to_string(), "Bob".to_string()),
            (DocumentChangeType::Removed, 1, -1, "bob".to_string(), "Bob".to_string()),
        ]
    );
}

#[tokio::test]
async fn transactions_read_then_write_atomically() {
    let store = facade_store();
    let reference = store.document("stats/global").unwrap();
    let mut data = DocumentData::new();
    data.insert("count".to_string(), WriteField::Value(Value::Integer(10)));
    reference.set(data).await.unwrap();

    store
        .run_transaction(&|transaction: &mut dyn facade::Transaction| {
            let snapshot = transaction.get(reference.as_ref())?;
            let current = match snapshot.data().and_then(|fields| fields.get("count").cloned()) {
                Some(Value::Integer(count)) => count,
                _ => 0,
            };
            let mut data = DocumentData::new();
            data.insert(
                "count".to_string(),
                WriteField::Value(Value::Integer(current + 1)),
            );
            transaction.set(reference.as_ref(), data)
        })
        .await
        .unwrap();

    let snapshot = reference.get(Source::Default).await.unwrap();
    assert_eq!(
        snapshot.data().unwrap().get("count"),
        Some(&Value::Integer(11))
    );
}

#[tokio::test]
async fn failed_transactions_leave_no_trace() {
    let store = facade_store();
    let reference = store.document("users/alice").unwrap();

    let err = store
        .run_transaction(&|transaction: &mut dyn facade::Transaction| {
            transaction.set(reference.as_ref(), person("Alice", 36))?;
            Err(facade::error::invalid_argument("abort"))
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), FirestoreErrorCode::InvalidArgument);
    assert!(!reference.get(Source::Default).await.unwrap().exists());
}

#[tokio::test]
async fn batches_commit_every_write_or_none() {
    let store = facade_store();
    let alice = store.document("users/alice").unwrap();
    let bob = store.document("users/bob").unwrap();

    let mut batch = store.batch();
    batch.set(alice.as_ref(), person("Alice", 36)).unwrap();
    batch.set(bob.as_ref(), person("Bob", 25)).unwrap();
    batch.commit().await.unwrap();
    assert!(alice.get(Source::Default).await.unwrap().exists());
    assert!(bob.get(Source::Default).await.unwrap().exists());

    let mut batch = store.batch();
    batch.set(alice.as_ref(), person("Alison", 37)).unwrap();
    batch
        .update(store.document("users/ghost").unwrap().as_ref(), person("Ghost", 0))
        .unwrap();
    let err = batch.commit().await.unwrap_err();
    assert_eq!(err.code(), FirestoreErrorCode::NotFound);

    let typed = TypedDocumentSnapshot::<Person>::new(alice.get(Source::Default).await.unwrap());
    assert_eq!(
        typed.data().unwrap(),
        Some(Person {
            name: "Alice".to_string(),
            age: 36
        })
    );
}

#[tokio::test]
async fn add_creates_documents_with_generated_ids() {
    let store = facade_store();
    let collection = store.collection("users").unwrap();
    let reference = collection.add(person("Alice", 36)).await.unwrap();

    assert_eq!(reference.id().len(), 20);
    assert!(reference.get(Source::Default).await.unwrap().exists());
    assert_eq!(reference.parent().unwrap().path(), "users");
}

#[tokio::test]
async fn settings_survive_the_boundary() {
    let store = facade_store();
    let mut settings = store.settings();
    settings.host = "custom.host".to_string();
    settings.cache_size_bytes = 10 * 1024 * 1024;
    store.apply_settings(settings.clone()).unwrap();
    assert_eq!(store.settings(), settings);

    let mut invalid = settings;
    invalid.host.clear();
    let err = store.apply_settings(invalid).unwrap_err();
    assert_eq!(err.code(), FirestoreErrorCode::InvalidArgument);
}

#[tokio::test]
async fn path_validation_errors_are_forwarded() {
    let store = facade_store();
    let err = store.document("users").unwrap_err();
    assert_eq!(err.code(), FirestoreErrorCode::InvalidArgument);
    let err = store.collection("users/alice").unwrap_err();
    assert_eq!(err.code(), FirestoreErrorCode::InvalidArgument);
}
