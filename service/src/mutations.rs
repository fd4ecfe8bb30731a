// service/src/mutations.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Map};
use thiserror::Error;
use tracing::{error, info};

use models::collections;
use models::errors::StoreError;
use models::{AmbulanceBooking, DriverProfile, DriverStatus, EmergencyRequest, RequestStatus};
use storage::DocumentStore;

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("record '{0}' is not in the loaded list")]
    UnknownRecord(String),
    #[error("transition from '{from}' to '{to}' is not permitted")]
    InvalidTransition { from: String, to: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A request-shaped record the gateway can transition: an emergency request
/// or an ambulance booking, which share the status vocabulary.
pub trait StatusRecord {
    fn record_id(&self) -> &str;
    fn current_status(&self) -> RequestStatus;
    /// Mirrors a persisted transition into the in-memory record.
    fn apply_transition(&mut self, next: RequestStatus, at: DateTime<Utc>, reason: Option<&str>);
}

impl StatusRecord for EmergencyRequest {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn current_status(&self) -> RequestStatus {
        self.status
    }

    fn apply_transition(&mut self, next: RequestStatus, at: DateTime<Utc>, reason: Option<&str>) {
        self.status = next;
        match next {
            RequestStatus::Accepted => self.accepted_at = Some(at),
            RequestStatus::Completed => self.completed_at = Some(at),
            RequestStatus::Cancelled => {
                self.cancellation_reason = reason.map(|r| r.to_string());
            }
            RequestStatus::Pending => {}
        }
    }
}

impl StatusRecord for AmbulanceBooking {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn current_status(&self) -> RequestStatus {
        self.status
    }

    fn apply_transition(&mut self, next: RequestStatus, at: DateTime<Utc>, reason: Option<&str>) {
        self.status = next;
        match next {
            RequestStatus::Completed => self.completed_at = Some(at),
            RequestStatus::Cancelled => {
                self.cancellation_reason = reason.map(|r| r.to_string());
            }
            RequestStatus::Accepted | RequestStatus::Pending => {}
        }
    }
}

/// Applies status transitions to single records: persists the patch, then
/// mirrors it into the caller's loaded list so the screen reflects the
/// change without a re-fetch. On a store failure the list is left in its
/// pre-mutation state; the caller re-fetches to recover. No retry, no
/// rollback.
#[derive(Clone)]
pub struct MutationGateway {
    store: Arc<dyn DocumentStore>,
}

impl MutationGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        MutationGateway { store }
    }

    pub async fn approve_driver(
        &self,
        drivers: &mut [DriverProfile],
        id: &str,
    ) -> Result<(), TransitionError> {
        self.review_driver(drivers, id, DriverStatus::Approved).await
    }

    pub async fn reject_driver(
        &self,
        drivers: &mut [DriverProfile],
        id: &str,
    ) -> Result<(), TransitionError> {
        self.review_driver(drivers, id, DriverStatus::Rejected).await
    }

    async fn review_driver(
        &self,
        drivers: &mut [DriverProfile],
        id: &str,
        next: DriverStatus,
    ) -> Result<(), TransitionError> {
        let position = drivers
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| TransitionError::UnknownRecord(id.to_string()))?;
        let current = drivers[position].status;
        if !current.permits(next) {
            return Err(TransitionError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        let verified = next == DriverStatus::Approved;
        let now = Utc::now();
        let mut patch = Map::new();
        patch.insert("status".to_string(), json!(next.as_str()));
        patch.insert("isVerified".to_string(), json!(verified));
        patch.insert("updatedAt".to_string(), json!(now.to_rfc3339()));

        match self
            .store
            .update(collections::DRIVER_PROFILES, id, &patch)
            .await
        {
            Ok(_) => {
                let driver = &mut drivers[position];
                driver.status = next;
                driver.is_verified = verified;
                driver.updated_at = Some(now);
                info!(driver = id, status = %next, "driver review applied");
                Ok(())
            }
            Err(err) => {
                error!(driver = id, error = %err, "driver review write failed");
                Err(err.into())
            }
        }
    }

    pub async fn accept_request<R: StatusRecord>(
        &self,
        collection: &str,
        records: &mut [R],
        id: &str,
    ) -> Result<(), TransitionError> {
        self.transition(collection, records, id, RequestStatus::Accepted, None)
            .await
    }

    pub async fn complete_request<R: StatusRecord>(
        &self,
        collection: &str,
        records: &mut [R],
        id: &str,
    ) -> Result<(), TransitionError> {
        self.transition(collection, records, id, RequestStatus::Completed, None)
            .await
    }

    pub async fn cancel_request<R: StatusRecord>(
        &self,
        collection: &str,
        records: &mut [R],
        id: &str,
        reason: Option<&str>,
    ) -> Result<(), TransitionError> {
        self.transition(collection, records, id, RequestStatus::Cancelled, reason)
            .await
    }

    async fn transition<R: StatusRecord>(
        &self,
        collection: &str,
        records: &mut [R],
        id: &str,
        next: RequestStatus,
        reason: Option<&str>,
    ) -> Result<(), TransitionError> {
        let position = records
            .iter()
            .position(|r| r.record_id() == id)
            .ok_or_else(|| TransitionError::UnknownRecord(id.to_string()))?;
        let current = records[position].current_status();
        if !current.permits(next) {
            return Err(TransitionError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        let now = Utc::now();
        let mut patch = Map::new();
        patch.insert("status".to_string(), json!(next.as_str()));
        match next {
            RequestStatus::Accepted => {
                patch.insert("acceptedAt".to_string(), json!(now.to_rfc3339()));
            }
            RequestStatus::Completed => {
                patch.insert("completedAt".to_string(), json!(now.to_rfc3339()));
            }
            RequestStatus::Cancelled => {
                if let Some(reason) = reason {
                    patch.insert("cancellationReason".to_string(), json!(reason));
                }
            }
            RequestStatus::Pending => {}
        }

        match self.store.update(collection, id, &patch).await {
            Ok(_) => {
                records[position].apply_transition(next, now, reason);
                info!(collection, record = id, status = %next, "transition applied");
                Ok(())
            }
            Err(err) => {
                error!(collection, record = id, error = %err, "transition write failed");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{Document, FromDocument};
    use serde_json::{json, Value};
    use storage::InMemoryStore;

    async fn store_with_driver(data: Value) -> (Arc<InMemoryStore>, Vec<DriverProfile>) {
        let store = Arc::new(InMemoryStore::new());
        let doc = Document::new("d1", data);
        store
            .put(collections::DRIVER_PROFILES, doc.clone())
            .await
            .unwrap();
        let drivers = vec![DriverProfile::from_document(&doc)];
        (store, drivers)
    }

    #[tokio::test]
    async fn approving_a_pending_driver_updates_store_and_list() {
        let (store, mut drivers) =
            store_with_driver(json!({ "status": "pending", "fullName": "A" })).await;
        let gateway = MutationGateway::new(store.clone() as Arc<dyn DocumentStore>);

        gateway.approve_driver(&mut drivers, "d1").await.unwrap();

        // list reflects the change without a re-fetch
        assert_eq!(drivers[0].status, DriverStatus::Approved);
        assert!(drivers[0].is_verified);
        assert_eq!(drivers[0].full_name, "A");
        assert!(drivers[0].updated_at.is_some());

        // and so does the store
        let stored = store
            .get(collections::DRIVER_PROFILES, "d1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.data["status"], "approved");
        assert_eq!(stored.data["isVerified"], true);
        assert_eq!(stored.data["fullName"], "A");
    }

    #[tokio::test]
    async fn re_review_flips_a_rejected_driver_back() {
        let (store, mut drivers) = store_with_driver(json!({ "status": "rejected" })).await;
        let gateway = MutationGateway::new(store as Arc<dyn DocumentStore>);
        gateway.approve_driver(&mut drivers, "d1").await.unwrap();
        assert_eq!(drivers[0].status, DriverStatus::Approved);
    }

    #[tokio::test]
    async fn a_failed_write_leaves_the_list_untouched() {
        let (store, mut drivers) = store_with_driver(json!({ "status": "pending" })).await;
        store.set_fail_writes(true);
        let gateway = MutationGateway::new(store.clone() as Arc<dyn DocumentStore>);

        let err = gateway.approve_driver(&mut drivers, "d1").await.unwrap_err();
        assert!(matches!(err, TransitionError::Store(_)));
        assert_eq!(drivers[0].status, DriverStatus::Pending);
        assert!(!drivers[0].is_verified);

        let stored = store
            .get(collections::DRIVER_PROFILES, "d1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.data["status"], "pending");
    }

    #[tokio::test]
    async fn unknown_records_and_bad_transitions_are_rejected() {
        let (store, mut drivers) = store_with_driver(json!({ "status": "approved" })).await;
        let gateway = MutationGateway::new(store as Arc<dyn DocumentStore>);
        assert!(matches!(
            gateway.approve_driver(&mut drivers, "nope").await,
            Err(TransitionError::UnknownRecord(_))
        ));
        // approved -> approved is not a permitted edge
        assert!(matches!(
            gateway.approve_driver(&mut drivers, "d1").await,
            Err(TransitionError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn request_lifecycle_stamps_timestamps_and_reason() {
        let store = Arc::new(InMemoryStore::new());
        let doc = Document::new("r1", json!({ "status": "pending" }));
        store
            .put(collections::EMERGENCY_REQUESTS, doc.clone())
            .await
            .unwrap();
        let mut requests = vec![EmergencyRequest::from_document(&doc)];
        let gateway = MutationGateway::new(store.clone() as Arc<dyn DocumentStore>);

        gateway
            .accept_request(collections::EMERGENCY_REQUESTS, &mut requests, "r1")
            .await
            .unwrap();
        assert_eq!(requests[0].status, RequestStatus::Accepted);
        assert!(requests[0].accepted_at.is_some());

        gateway
            .complete_request(collections::EMERGENCY_REQUESTS, &mut requests, "r1")
            .await
            .unwrap();
        assert_eq!(requests[0].status, RequestStatus::Completed);
        assert!(requests[0].completed_at.is_some());

        // completed is terminal
        assert!(matches!(
            gateway
                .cancel_request(
                    collections::EMERGENCY_REQUESTS,
                    &mut requests,
                    "r1",
                    Some("duplicate")
                )
                .await,
            Err(TransitionError::InvalidTransition { .. })
        ));

        let stored = store
            .get(collections::EMERGENCY_REQUESTS, "r1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.data["status"], "completed");
        assert!(stored.data.get("completedAt").is_some());
    }

    #[tokio::test]
    async fn cancelling_a_pending_booking_records_the_reason() {
        let store = Arc::new(InMemoryStore::new());
        let doc = Document::new("b1", json!({ "status": "pending" }));
        store
            .put(collections::AMBULANCE_BOOKINGS, doc.clone())
            .await
            .unwrap();
        let mut bookings = vec![AmbulanceBooking::from_document(&doc)];
        let gateway = MutationGateway::new(store.clone() as Arc<dyn DocumentStore>);

        gateway
            .cancel_request(
                collections::AMBULANCE_BOOKINGS,
                &mut bookings,
                "b1",
                Some("caller cancelled"),
            )
            .await
            .unwrap();
        assert_eq!(bookings[0].status, RequestStatus::Cancelled);
        assert_eq!(
            bookings[0].cancellation_reason.as_deref(),
            Some("caller cancelled")
        );
        let stored = store
            .get(collections::AMBULANCE_BOOKINGS, "b1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.data["cancellationReason"], "caller cancelled");
    }
}
