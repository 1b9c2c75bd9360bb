use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::settings::{FilterOperator, SortDirection, Source};
use crate::snapshot::{DocumentSnapshot, SnapshotMetadata};
use crate::store::{ListenerRegistration, QueryCallback, StoreInner};
use crate::value::{FieldPath, Fields, Value};

/// How a document moved between two emissions of the same listener.
///
/// Non-exhaustive: later store versions may report transitions this list
/// does not carry yet.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentChangeType {
    Added,
    Modified,
    Removed,
}

/// A document transition, with positions in the result ordering. `-1` marks
/// an index that does not exist on one side of the transition.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentChange {
    document: DocumentSnapshot,
    change_type: DocumentChangeType,
    old_index: i32,
    new_index: i32,
}

impl DocumentChange {
    pub fn new(
        document: DocumentSnapshot,
        change_type: DocumentChangeType,
        old_index: i32,
        new_index: i32,
    ) -> Self {
        Self {
            document,
            change_type,
            old_index,
            new_index,
        }
    }

    pub fn document(&self) -> &DocumentSnapshot {
        &self.document
    }

    pub fn change_type(&self) -> DocumentChangeType {
        self.change_type
    }

    pub fn old_index(&self) -> i32 {
        self.old_index
    }

    pub fn new_index(&self) -> i32 {
        self.new_index
    }
}

/// The result set of a query read or listener emission.
#[derive(Clone, Debug, PartialEq)]
pub struct QuerySnapshot {
    documents: Vec<DocumentSnapshot>,
    changes: Vec<DocumentChange>,
}

impl QuerySnapshot {
    pub fn new(documents: Vec<DocumentSnapshot>, changes: Vec<DocumentChange>) -> Self {
        Self { documents, changes }
    }

    pub fn documents(&self) -> &[DocumentSnapshot] {
        &self.documents
    }

    pub fn changes(&self) -> &[DocumentChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct QueryFilter {
    pub path: FieldPath,
    pub operator: FilterOperator,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct QueryOrder {
    pub path: FieldPath,
    pub direction: SortDirection,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct QueryDefinition {
    pub collection_path: String,
    pub filters: Vec<QueryFilter>,
    pub order_by: Vec<QueryOrder>,
    pub limit: Option<u32>,
}

impl QueryDefinition {
    fn new(collection_path: String) -> Self {
        Self {
            collection_path,
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }
}

/// An immutable query over the documents directly inside one collection.
/// Builder methods return extended copies.
#[derive(Clone)]
pub struct Query {
    store: Arc<StoreInner>,
    definition: QueryDefinition,
}

impl Query {
    pub(crate) fn new(store: Arc<StoreInner>, collection_path: String) -> Self {
        Self {
            store,
            definition: QueryDefinition::new(collection_path),
        }
    }

    pub fn where_field(&self, path: FieldPath, operator: FilterOperator, value: Value) -> Query {
        let mut next = self.clone();
        next.definition.filters.push(QueryFilter {
            path,
            operator,
            value,
        });
        next
    }

    pub fn order_by(&self, path: FieldPath, direction: SortDirection) -> Query {
        let mut next = self.clone();
        next.definition.order_by.push(QueryOrder { path, direction });
        next
    }

    pub fn limit(&self, count: u32) -> Query {
        let mut next = self.clone();
        next.definition.limit = Some(count);
        next
    }

    /// Executes the query once. One-shot reads carry no change list.
    pub async fn get(&self, source: Source) -> Result<QuerySnapshot> {
        let metadata = SnapshotMetadata::new(false, matches!(source, Source::Cache));
        let documents = self.store.execute_query(&self.definition, metadata);
        Ok(QuerySnapshot::new(documents, Vec::new()))
    }

    pub fn listen(&self, callback: QueryCallback) -> ListenerRegistration {
        self.store.listen_query(self.definition.clone(), callback)
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store) && self.definition == other.definition
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("definition", &self.definition)
            .finish()
    }
}

/// Filters, orders, and limits the documents of one collection.
pub(crate) fn run_query(
    documents: &BTreeMap<String, Fields>,
    definition: &QueryDefinition,
    metadata: SnapshotMetadata,
) -> Vec<DocumentSnapshot> {
    let prefix = format!("{}/", definition.collection_path);
    let mut matches = Vec::new();

    for (path, fields) in documents.range(prefix.clone()..) {
        if !path.starts_with(&prefix) {
            break;
        }
        // Skip documents of nested subcollections.
        if path[prefix.len()..].contains('/') {
            continue;
        }
        let snapshot = DocumentSnapshot::new(path.as_str(), Some(fields.clone()), metadata);
        let matched = definition
            .filters
            .iter()
            .all(|filter| evaluate_filter(&snapshot, filter));
        if matched {
            matches.push(snapshot);
        }
    }

    matches.sort_by(|left, right| compare_documents(left, right, &definition.order_by));

    if let Some(limit) = definition.limit {
        matches.truncate(limit as usize);
    }
    matches
}

fn evaluate_filter(snapshot: &DocumentSnapshot, filter: &QueryFilter) -> bool {
    // A missing field matches nothing, not even inequality filters.
    let Some(actual) = snapshot.field(&filter.path) else {
        return false;
    };
    match filter.operator {
        FilterOperator::Equal => actual == filter.value,
        FilterOperator::NotEqual => actual != filter.value,
        FilterOperator::LessThan => {
            compare_values(&actual, &filter.value) == Some(Ordering::Less)
        }
        FilterOperator::LessThanOrEqual => matches!(
            compare_values(&actual, &filter.value),
            Some(Ordering::Less) | Some(Ordering::Equal)
        ),
        FilterOperator::GreaterThan => {
            compare_values(&actual, &filter.value) == Some(Ordering::Greater)
        }
        FilterOperator::GreaterThanOrEqual => matches!(
            compare_values(&actual, &filter.value),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        ),
        FilterOperator::ArrayContains => match actual {
            Value::Array(values) => values.contains(&filter.value),
            _ => false,
        },
    }
}

fn compare_documents(
    left: &DocumentSnapshot,
    right: &DocumentSnapshot,
    order_by: &[QueryOrder],
) -> Ordering {
    for order in order_by {
        let ordering = match (left.field(&order.path), right.field(&order.path)) {
            (Some(l), Some(r)) => compare_values(&l, &r).unwrap_or(Ordering::Equal),
            // Documents without the ordered field sort first, like the
            // hosted backend.
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        let ordering = match order.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    left.path().cmp(right.path())
}

/// Total order over comparable values; `None` for mixed-type comparisons
/// other than integer/double.
fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Boolean(l), Value::Boolean(r)) => Some(l.cmp(r)),
        (Value::Integer(l), Value::Integer(r)) => Some(l.cmp(r)),
        (Value::Double(l), Value::Double(r)) => l.partial_cmp(r),
        (Value::Integer(l), Value::Double(r)) => (*l as f64).partial_cmp(r),
        (Value::Double(l), Value::Integer(r)) => l.partial_cmp(&(*r as f64)),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Timestamp(l), Value::Timestamp(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// Diffs two orderings of the same query into per-document transitions.
pub(crate) fn compute_changes(
    previous: &[DocumentSnapshot],
    next: &[DocumentSnapshot],
) -> Vec<DocumentChange> {
    let mut changes = Vec::new();
    for (index, document) in next.iter().enumerate() {
        let old_position = previous
            .iter()
            .position(|candidate| candidate.path() == document.path());
        match old_position {
            None => changes.push(DocumentChange::new(
                document.clone(),
                DocumentChangeType::Added,
                -1,
                index as i32,
            )),
            Some(old_index) => {
                if previous[old_index].data() != document.data() {
                    changes.push(DocumentChange::new(
                        document.clone(),
                        DocumentChangeType::Modified,
                        old_index as i32,
                        index as i32,
                    ));
                }
            }
        }
    }
    for (old_index, document) in previous.iter().enumerate() {
        let still_present = next
            .iter()
            .any(|candidate| candidate.path() == document.path());
        if !still_present {
            changes.push(DocumentChange::new(
                document.clone(),
                DocumentChangeType::Removed,
                old_index as i32,
                -1,
            ));
        }
    }
    changes
}
