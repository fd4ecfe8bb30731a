// storage/src/memory_store.rs

//! In-memory engines with the same semantics as the sled-backed ones. Used
//! by tests and local runs; the write-failure toggle exists so callers can
//! exercise their mutation-failure paths.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{broadcast, Mutex, RwLock};

use models::errors::{StoreError, StoreResult};
use models::Document;

use crate::document_store::{
    sort_documents, ChangeEvent, DocumentStore, OrderBy, Subscription,
};
use crate::object_store::{ObjectRef, ObjectStore};

const WATCH_BUFFER: usize = 64;

struct WatchEntry {
    sender: broadcast::Sender<ChangeEvent>,
    active: Arc<AtomicUsize>,
}

#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    indexes: RwLock<HashSet<(String, String)>>,
    watchers: Mutex<HashMap<String, WatchEntry>>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    /// Makes every subsequent write fail, for exercising mutation-failure
    /// handling in callers.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::WriteFailed(
                "store is rejecting writes".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    async fn notify(&self, collection: &str, document: &Document) {
        let watchers = self.watchers.lock().await;
        if let Some(entry) = watchers.get(collection) {
            let _ = entry.sender.send(ChangeEvent::Upserted {
                collection: collection.to_string(),
                document: document.clone(),
            });
        }
    }

    pub async fn active_watchers(&self, collection: &str) -> usize {
        let watchers = self.watchers.lock().await;
        watchers
            .get(collection)
            .map(|entry| entry.active.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn fetch_all(
        &self,
        collection: &str,
        order: Option<&OrderBy>,
    ) -> StoreResult<Vec<Document>> {
        if let Some(order) = order {
            let indexes = self.indexes.read().await;
            if !indexes.contains(&(collection.to_string(), order.field.clone())) {
                return Err(StoreError::MissingIndex {
                    collection: collection.to_string(),
                    field: order.field.clone(),
                });
            }
        }
        let collections = self.collections.read().await;
        let mut documents: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default();
        if let Some(order) = order {
            sort_documents(&mut documents, order);
        }
        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn put(&self, collection: &str, document: Document) -> StoreResult<()> {
        self.check_writable()?;
        {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(document.id.clone(), document.data.clone());
        }
        self.notify(collection, &document).await;
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &Map<String, Value>,
    ) -> StoreResult<Document> {
        self.check_writable()?;
        let document = {
            let mut collections = self.collections.write().await;
            let docs = collections
                .get_mut(collection)
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;
            let data = docs.get_mut(id).ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
            match data.as_object_mut() {
                Some(object) => {
                    for (key, value) in patch {
                        object.insert(key.clone(), value.clone());
                    }
                }
                None => {
                    return Err(StoreError::Serialization(format!(
                        "document '{}' in '{}' is not a JSON object",
                        id, collection
                    )))
                }
            }
            Document::new(id, data.clone())
        };
        self.notify(collection, &document).await;
        Ok(document)
    }

    async fn create_index(&self, collection: &str, field: &str) -> StoreResult<()> {
        let mut indexes = self.indexes.write().await;
        indexes.insert((collection.to_string(), field.to_string()));
        Ok(())
    }

    async fn watch(&self, collection: &str) -> StoreResult<Subscription> {
        let mut watchers = self.watchers.lock().await;
        let entry = watchers
            .entry(collection.to_string())
            .or_insert_with(|| {
                let (sender, _) = broadcast::channel(WATCH_BUFFER);
                WatchEntry {
                    sender,
                    active: Arc::new(AtomicUsize::new(0)),
                }
            });
        Ok(Subscription::new(
            collection.to_string(),
            entry.sender.subscribe(),
            Arc::clone(&entry.active),
        ))
    }
}

/// In-memory object store: a map from path to the URL the blob would be
/// served from.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, String>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        MemoryObjectStore::default()
    }

    pub async fn insert(&self, path: impl Into<String>, url: impl Into<String>) {
        let mut objects = self.objects.write().await;
        objects.insert(path.into(), url.into());
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn download_url(&self, path: &str) -> StoreResult<String> {
        let objects = self.objects.read().await;
        objects
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::ObjectNotFound(path.to_string()))
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectRef>> {
        let normalized = format!("{}/", prefix.trim_end_matches('/'));
        let objects = self.objects.read().await;
        let mut refs: Vec<ObjectRef> = objects
            .keys()
            .filter(|path| path.starts_with(&normalized))
            .map(|path| ObjectRef {
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                path: path.clone(),
            })
            .collect();
        if refs.is_empty() {
            return Err(StoreError::ObjectNotFound(prefix.to_string()));
        }
        refs.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(refs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn behaves_like_the_sled_engine_for_ordering() {
        let store = InMemoryStore::new();
        store
            .put("trips", Document::new("t1", json!({ "createdAt": 100 })))
            .await
            .unwrap();
        let order = OrderBy::desc("createdAt");
        assert!(store
            .fetch_all("trips", Some(&order))
            .await
            .unwrap_err()
            .is_missing_index());
        store.create_index("trips", "createdAt").await.unwrap();
        assert_eq!(store.fetch_all("trips", Some(&order)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn write_failure_toggle_rejects_puts_and_updates() {
        let store = InMemoryStore::new();
        store
            .put("drivers", Document::new("d1", json!({ "status": "pending" })))
            .await
            .unwrap();
        store.set_fail_writes(true);
        assert!(matches!(
            store
                .put("drivers", Document::new("d2", json!({})))
                .await,
            Err(StoreError::WriteFailed(_))
        ));
        let mut patch = Map::new();
        patch.insert("status".to_string(), json!("approved"));
        assert!(matches!(
            store.update("drivers", "d1", &patch).await,
            Err(StoreError::WriteFailed(_))
        ));
        store.set_fail_writes(false);
        store.update("drivers", "d1", &patch).await.unwrap();
    }

    #[tokio::test]
    async fn object_listing_filters_by_folder_prefix() {
        let objects = MemoryObjectStore::new();
        objects
            .insert("driver_documents/d1/driving_license.pdf", "https://cdn/x")
            .await;
        objects
            .insert("driver_documents/d1/police_report.pdf", "https://cdn/y")
            .await;
        objects
            .insert("driver_documents/d2/driving_license.pdf", "https://cdn/z")
            .await;
        let refs = objects.list("driver_documents/d1").await.unwrap();
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().all(|r| r.path.starts_with("driver_documents/d1/")));
        assert!(objects.list("driver_documents/d9").await.is_err());
    }
}
