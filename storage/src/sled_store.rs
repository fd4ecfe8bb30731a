// storage/src/sled_store.rs

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use serde_json::{Map, Value};
use tokio::sync::{broadcast, Mutex};

use models::errors::{StoreError, StoreResult};
use models::Document;

use crate::document_store::{
    sort_documents, ChangeEvent, DocumentStore, OrderBy, Subscription,
};

/// Tree holding the index registry; never used as a collection name.
const INDEX_TREE: &str = "__indexes";

/// Channel depth per watched collection. Screens that lag simply skip ahead.
const WATCH_BUFFER: usize = 64;

struct WatchEntry {
    sender: broadcast::Sender<ChangeEvent>,
    active: Arc<AtomicUsize>,
}

/// Sled-backed document store: one tree per collection, JSON-encoded
/// documents keyed by id, an index registry gating ordered fetches.
pub struct SledStore {
    db: sled::Db,
    watchers: Mutex<HashMap<String, WatchEntry>>,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        info!("opening sled document store at {:?}", path);
        let db = sled::open(path)?;
        Ok(SledStore {
            db,
            watchers: Mutex::new(HashMap::new()),
        })
    }

    fn tree(&self, collection: &str) -> StoreResult<sled::Tree> {
        if collection == INDEX_TREE {
            return Err(StoreError::Backend(format!(
                "'{}' is a reserved collection name",
                INDEX_TREE
            )));
        }
        Ok(self.db.open_tree(collection)?)
    }

    fn index_key(collection: &str, field: &str) -> String {
        format!("{}/{}", collection, field)
    }

    fn has_index(&self, collection: &str, field: &str) -> StoreResult<bool> {
        let registry = self.db.open_tree(INDEX_TREE)?;
        Ok(registry
            .contains_key(Self::index_key(collection, field).as_bytes())?)
    }

    async fn notify(&self, collection: &str, document: &Document) {
        let watchers = self.watchers.lock().await;
        if let Some(entry) = watchers.get(collection) {
            // send only fails when every receiver is gone; nothing to do then
            let _ = entry.sender.send(ChangeEvent::Upserted {
                collection: collection.to_string(),
                document: document.clone(),
            });
        }
    }

    /// Live watcher count for a collection; subscriptions deregister on drop.
    pub async fn active_watchers(&self, collection: &str) -> usize {
        let watchers = self.watchers.lock().await;
        watchers
            .get(collection)
            .map(|entry| entry.active.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Flushes sled's dirty pages; called on shutdown.
    pub async fn flush(&self) -> StoreResult<()> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SledStore {
    async fn fetch_all(
        &self,
        collection: &str,
        order: Option<&OrderBy>,
    ) -> StoreResult<Vec<Document>> {
        if let Some(order) = order {
            if !self.has_index(collection, &order.field)? {
                return Err(StoreError::MissingIndex {
                    collection: collection.to_string(),
                    field: order.field.clone(),
                });
            }
        }
        let tree = self.tree(collection)?;
        let mut documents = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            let (key, value) = entry?;
            let id = String::from_utf8_lossy(&key).to_string();
            let data: Value = serde_json::from_slice(&value)?;
            documents.push(Document::new(id, data));
        }
        if let Some(order) = order {
            sort_documents(&mut documents, order);
        }
        debug!(
            "fetched {} documents from '{}' (ordered: {})",
            documents.len(),
            collection,
            order.is_some()
        );
        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let tree = self.tree(collection)?;
        match tree.get(id.as_bytes())? {
            Some(value) => {
                let data: Value = serde_json::from_slice(&value)?;
                Ok(Some(Document::new(id, data)))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, collection: &str, document: Document) -> StoreResult<()> {
        let tree = self.tree(collection)?;
        let encoded = serde_json::to_vec(&document.data)?;
        tree.insert(document.id.as_bytes(), encoded)?;
        self.notify(collection, &document).await;
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &Map<String, Value>,
    ) -> StoreResult<Document> {
        let tree = self.tree(collection)?;
        let current = tree
            .get(id.as_bytes())?
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        let mut data: Value = serde_json::from_slice(&current)?;
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
        tree.insert(id.as_bytes(), serde_json::to_vec(&data)?)?;
        let document = Document::new(id, data);
        self.notify(collection, &document).await;
        Ok(document)
    }

    async fn create_index(&self, collection: &str, field: &str) -> StoreResult<()> {
        let registry = self.db.open_tree(INDEX_TREE)?;
        registry.insert(Self::index_key(collection, field).as_bytes(), &[])?;
        info!("registered index on '{}' field '{}'", collection, field);
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
