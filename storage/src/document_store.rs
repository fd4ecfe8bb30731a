// storage/src/document_store.rs

use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use models::errors::StoreResult;
use models::fields::decode_timestamp;
use models::Document;

/// An ordering predicate for [`DocumentStore::fetch_all`]. Ordered fetches
/// require a registered index on `(collection, field)` and fail with
/// `StoreError::MissingIndex` otherwise, mirroring the managed store this
/// seam stands in for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            descending: true,
        }
    }
}

/// A change notification delivered to collection watchers.
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    Upserted {
        collection: String,
        document: Document,
    },
}

/// Counts live watchers of one collection; decremented exactly once when a
/// [`Subscription`] is dropped.
#[derive(Debug)]
pub(crate) struct SubscriptionGuard {
    active: Arc<AtomicUsize>,
}

impl SubscriptionGuard {
    pub(crate) fn new(active: Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, AtomicOrdering::SeqCst);
        SubscriptionGuard { active }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, AtomicOrdering::SeqCst);
    }
}

/// A long-lived change feed for one collection. Dropping it releases the
/// watcher registration; notifications from different subscriptions are
/// independent and may interleave arbitrarily.
#[derive(Debug)]
pub struct Subscription {
    collection: String,
    receiver: broadcast::Receiver<ChangeEvent>,
    _guard: SubscriptionGuard,
}

impl Subscription {
    pub(crate) fn new(
        collection: String,
        receiver: broadcast::Receiver<ChangeEvent>,
        active: Arc<AtomicUsize>,
    ) -> Self {
        Subscription {
            collection,
            receiver,
            _guard: SubscriptionGuard::new(active),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Next change, or `None` once the store side is gone. A lagged receiver
    /// skips ahead rather than erroring; dropped notifications are acceptable
    /// for a screen that re-fetches on demand.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!(
                        "subscription on '{}' lagged, skipped {} events",
                        self.collection,
                        skipped
                    );
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// The document-database seam. Collections are schemaless; documents are
/// addressed by collection + id and carry arbitrary JSON objects.
/// Concurrency follows the managed store's per-document write semantics:
/// last write wins, no transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection, optionally ordered. An order predicate
    /// without a supporting index fails with `StoreError::MissingIndex`.
    async fn fetch_all(
        &self,
        collection: &str,
        order: Option<&OrderBy>,
    ) -> StoreResult<Vec<Document>>;

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    async fn put(&self, collection: &str, document: Document) -> StoreResult<()>;

    /// Shallow field merge into an existing document; `StoreError::NotFound`
    /// when the document is absent. Returns the merged document.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &Map<String, Value>,
    ) -> StoreResult<Document>;

    /// Registers `field` as an order key for `collection`.
    async fn create_index(&self, collection: &str, field: &str) -> StoreResult<()>;

    /// Opens a change feed for a collection.
    async fn watch(&self, collection: &str) -> StoreResult<Subscription>;
}

/// Field comparison used by both engines when a supporting index exists:
/// timestamps, then numbers, then strings; documents missing the field sort
/// last regardless of direction.
pub(crate) fn compare_by_field(a: &Document, b: &Document, field: &str) -> Ordering {
    match (a.data.get(field), b.data.get(field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => compare_values(left, right),
    }
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    if let (Some(l), Some(r)) = (decode_timestamp(left), decode_timestamp(right)) {
        return l.cmp(&r);
    }
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        return l.partial_cmp(&r).unwrap_or(Ordering::Equal);
    }
    match (left.as_str(), right.as_str()) {
        (Some(l), Some(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}

pub(crate) fn sort_documents(documents: &mut [Document], order: &OrderBy) {
    documents.sort_by(|a, b| {
        let ordering = compare_by_field(a, b, &order.field);
        if order.descending {
            // missing-field documents still sort last
            match (a.data.get(&order.field), b.data.get(&order.field)) {
                (None, _) | (_, None) => ordering,
                _ => ordering.reverse(),
            }
        } else {
            ordering
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        Document::new(id, data)
    }

    #[test]
    fn sorts_mixed_timestamp_representations() {
        let mut docs = vec![
            doc("a", json!({ "createdAt": "2025-05-01T00:00:00Z" })),
            doc("b", json!({ "createdAt": { "seconds": 1_700_000_000 } })),
            doc("c", json!({ "createdAt": 1_800_000_000 })),
        ];
        sort_documents(&mut docs, &OrderBy::asc("createdAt"));
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn missing_field_sorts_last_in_both_directions() {
        let mut docs = vec![
            doc("missing", json!({})),
            doc("late", json!({ "rating": 4.5 })),
            doc("early", json!({ "rating": 1.0 })),
        ];
        sort_documents(&mut docs, &OrderBy::asc("rating"));
        assert_eq!(docs.last().unwrap().id, "missing");
        sort_documents(&mut docs, &OrderBy::desc("rating"));
        assert_eq!(docs[0].id, "late");
        assert_eq!(docs.last().unwrap().id, "missing");
    }
}
