// service/src/live.rs

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use models::errors::StoreResult;
use models::{EmergencyRequest, FromDocument};
use storage::{ChangeEvent, DocumentStore};

/// Rolling window of the newest requests, ordered by creation time
/// descending. Records without a timestamp sort oldest.
#[derive(Debug, Clone)]
pub struct RecentRequests {
    capacity: usize,
    records: Vec<EmergencyRequest>,
}

impl RecentRequests {
    pub fn new(capacity: usize) -> Self {
        RecentRequests {
            capacity,
            records: Vec::new(),
        }
    }

    /// Upserts the changed record and re-trims the window.
    pub fn apply(&mut self, event: &ChangeEvent) {
        let ChangeEvent::Upserted { document, .. } = event;
        let record = EmergencyRequest::from_document(document);
        self.upsert(record);
    }

    pub fn upsert(&mut self, record: EmergencyRequest) {
        self.records.retain(|existing| existing.id != record.id);
        self.records.push(record);
        self.records
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.records.truncate(self.capacity);
    }

    pub fn snapshot(&self) -> &[EmergencyRequest] {
        &self.records
    }
}

/// A live view over one collection: seeds from a full fetch, then follows
/// the change feed on a background task. Dropping the feed aborts the task,
/// which releases its store subscription exactly once.
pub struct LiveFeed {
    recent: Arc<RwLock<RecentRequests>>,
    worker: JoinHandle<()>,
}

impl LiveFeed {
    pub async fn spawn(
        store: Arc<dyn DocumentStore>,
        collection: &str,
        capacity: usize,
    ) -> StoreResult<LiveFeed> {
        let mut seed = RecentRequests::new(capacity);
        for document in store.fetch_all(collection, None).await? {
            seed.upsert(EmergencyRequest::from_document(&document));
        }
        let recent = Arc::new(RwLock::new(seed));

        let mut subscription = store.watch(collection).await?;
        let shared = Arc::clone(&recent);
        let worker = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                shared.write().await.apply(&event);
            }
            debug!("live feed change stream closed");
        });

        Ok(LiveFeed { recent, worker })
    }

    pub async fn snapshot(&self) -> Vec<EmergencyRequest> {
        self.recent.read().await.snapshot().to_vec()
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::collections;
    use models::Document;
    use serde_json::json;
    use storage::InMemoryStore;
    use tokio::time::{sleep, Duration};

    fn request_doc(id: &str, created: &str) -> Document {
        Document::new(id, json!({ "createdAt": created, "status": "pending" }))
    }

    #[tokio::test]
    async fn window_keeps_the_newest_records_first() {
        let mut recent = RecentRequests::new(2);
        for (id, ts) in [
            ("r1", "2025-04-01T00:00:00Z"),
            ("r2", "2025-04-03T00:00:00Z"),
            ("r3", "2025-04-02T00:00:00Z"),
        ] {
            recent.upsert(EmergencyRequest::from_document(&request_doc(id, ts)));
        }
        let ids: Vec<&str> = recent.snapshot().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r3"]);
    }

    #[tokio::test]
    async fn feed_follows_writes_and_releases_its_subscription_on_drop() {
        let store = Arc::new(InMemoryStore::new());
        store
            .put(
                collections::EMERGENCY_REQUESTS,
                request_doc("r1", "2025-04-01T00:00:00Z"),
            )
            .await
            .unwrap();

        let feed = LiveFeed::spawn(
            store.clone() as Arc<dyn DocumentStore>,
            collections::EMERGENCY_REQUESTS,
            5,
        )
        .await
        .unwrap();
        assert_eq!(feed.snapshot().await.len(), 1);
        assert_eq!(
            store.active_watchers(collections::EMERGENCY_REQUESTS).await,
            1
        );

        store
            .put(
                collections::EMERGENCY_REQUESTS,
                request_doc("r2", "2025-04-02T00:00:00Z"),
            )
            .await
            .unwrap();
        // give the worker a turn to drain the event
        sleep(Duration::from_millis(50)).await;
        let snapshot = feed.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, "r2");

        drop(feed);
        sleep(Duration::from_millis(50)).await;
        assert_eq!(
            store.active_watchers(collections::EMERGENCY_REQUESTS).await,
            0
        );
    }
}
