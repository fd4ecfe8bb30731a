// rest_api/src/lib.rs

use std::path::Path as FsPath;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use models::collections;
use models::errors::{StoreError, StoreResult};
use models::{
    AdminProfile, AmbulanceBooking, DriverLocation, DriverProfile, EmergencyRequest, UserProfile,
};
use service::{
    daily_series, group_counts, CollectionReader, DashboardStats, DocumentKind, DocumentProbe,
    FetchOutcome, LiveFeed, MutationGateway, ReadError, TransitionError,
};
use storage::{DocumentStore, ObjectStore, OrderBy};

pub mod auth;
pub mod config;

use auth::AdminAuth;
pub use config::{load_config, AdminApiConfig, ServerConfig};

/// Dashboard "recent requests" window size.
const RECENT_WINDOW: usize = 5;

/// Index registrations applied at startup; the screens order by these.
pub const STARTUP_INDEXES: &[(&str, &str)] = &[
    (collections::DRIVER_PROFILES, "updatedAt"),
    (collections::USER_PROFILES, "updatedAt"),
    (collections::EMERGENCY_REQUESTS, "createdAt"),
    (collections::AMBULANCE_BOOKINGS, "createdAt"),
    (collections::AMBULANCE_REQUESTS, "createdAt"),
];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Read(ReadError::Validation { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            ApiError::Transition(TransitionError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            ApiError::Transition(TransitionError::UnknownRecord(_)) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        let body = Json(json!({
            "status": "error",
            "message": message,
        }));
        (status, body).into_response()
    }
}

/// Shared state for the Axum application. Every component gets its store
/// handle here, at construction; nothing reaches for a global.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub reader: CollectionReader,
    pub gateway: MutationGateway,
    pub probe: DocumentProbe,
    pub live: Arc<LiveFeed>,
    pub jwt_secret: Arc<Vec<u8>>,
}

impl AppState {
    pub async fn new(
        store: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
        jwt_secret: Vec<u8>,
    ) -> StoreResult<Self> {
        let live = LiveFeed::spawn(
            Arc::clone(&store),
            collections::EMERGENCY_REQUESTS,
            RECENT_WINDOW,
        )
        .await?;
        Ok(AppState {
            reader: CollectionReader::new(Arc::clone(&store)),
            gateway: MutationGateway::new(Arc::clone(&store)),
            probe: DocumentProbe::new(objects),
            live: Arc::new(live),
            jwt_secret: Arc::new(jwt_secret),
            store,
        })
    }
}

/// Creates the bootstrap admin account when the `admins` collection is
/// empty. Safe to call on every startup; existing admins win.
pub async fn ensure_default_admin(
    store: &Arc<dyn DocumentStore>,
    email: &str,
    password: &str,
) -> StoreResult<bool> {
    let existing = store.fetch_all(collections::ADMINS, None).await?;
    if !existing.is_empty() {
        return Ok(false);
    }
    let admin = AdminProfile::new(email, "Administrator", password)
        .map_err(|e| StoreError::Backend(format!("failed to hash bootstrap password: {}", e)))?;
    store.put(collections::ADMINS, admin.to_document()).await?;
    info!(email, "created bootstrap admin account");
    Ok(true)
}

// --------- Request/Response Structs ---------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct DriverListQuery {
    status: Option<String>,
    search: Option<String>,
    /// Strict decode: malformed documents become a 422 instead of defaults.
    strict: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct UserListQuery {
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct DateRangeQuery {
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CancelBody {
    reason: Option<String>,
}

/// The `{"status": "empty"}` envelope: an empty collection is a distinct,
/// retryable condition, not a bare empty list and not an error.
fn empty_envelope(key: &str, collection: &str) -> Json<Value> {
    let mut body = serde_json::Map::new();
    body.insert("status".to_string(), json!("empty"));
    body.insert(
        "message".to_string(),
        json!(format!("no documents in '{}'", collection)),
    );
    body.insert(key.to_string(), json!([]));
    Json(Value::Object(body))
}

// --------- Endpoint Handlers ---------

async fn health_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "message": "dispatch admin API is healthy" })),
    )
}

async fn version_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "version": env!("CARGO_PKG_VERSION"), "api_level": 1 })),
    )
}

async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let admins: Vec<AdminProfile> = state
        .reader
        .fetch(collections::ADMINS, None)
        .await?
        .into_records();
    if admins.is_empty() {
        warn!("login attempted with no admin accounts provisioned");
    }
    let admin = admins
        .iter()
        .find(|a| a.email.eq_ignore_ascii_case(&payload.email))
        .filter(|a| a.verify_password(&payload.password))
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;
    let token = auth::create_token(admin, state.jwt_secret.as_slice())?;
    Ok(Json(json!({
        "status": "success",
        "token": token,
        "email": admin.email,
    })))
}

async fn list_drivers_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<DriverListQuery>,
) -> Result<Json<Value>, ApiError> {
    let order = OrderBy::desc("updatedAt");
    let outcome: FetchOutcome<DriverProfile> = if query.strict.unwrap_or(false) {
        state
            .reader
            .fetch_validated(collections::DRIVER_PROFILES, Some(&order))
            .await?
    } else {
        state
            .reader
            .fetch(collections::DRIVER_PROFILES, Some(&order))
            .await?
    };
    let drivers = match outcome {
        FetchOutcome::Empty => {
            return Ok(empty_envelope("drivers", collections::DRIVER_PROFILES))
        }
        FetchOutcome::Records(drivers) => drivers,
    };

    let total = drivers.len();
    let filtered: Vec<&DriverProfile> = drivers
        .iter()
        .filter(|d| match query.status.as_deref() {
            None | Some("all") => true,
            Some(status) => d.status.as_str() == status,
        })
        .filter(|d| match query.search.as_deref() {
            None | Some("") => true,
            Some(term) => d.matches_search(term),
        })
        .collect();

    Ok(Json(json!({
        "status": "success",
        "total": total,
        "filtered": filtered.len(),
        "drivers": filtered,
    })))
}

async fn approve_driver_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    review_driver(&state, &id, true).await
}

async fn reject_driver_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    review_driver(&state, &id, false).await
}

async fn review_driver(state: &AppState, id: &str, approve: bool) -> Result<Json<Value>, ApiError> {
    let mut drivers: Vec<DriverProfile> = state
        .reader
        .fetch(collections::DRIVER_PROFILES, None)
        .await?
        .into_records();
    if approve {
        state.gateway.approve_driver(&mut drivers, id).await?;
    } else {
        state.gateway.reject_driver(&mut drivers, id).await?;
    }
    let driver = drivers
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| ApiError::NotFound(format!("driver '{}'", id)))?;
    Ok(Json(json!({ "status": "success", "driver": driver })))
}

async fn driver_locations_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<Value>, ApiError> {
    let outcome: FetchOutcome<DriverLocation> = state
        .reader
        .fetch(collections::DRIVER_LOCATIONS, None)
        .await?;
    match outcome {
        FetchOutcome::Empty => Ok(empty_envelope("locations", collections::DRIVER_LOCATIONS)),
        FetchOutcome::Records(locations) => {
            let online: Vec<&DriverLocation> =
                locations.iter().filter(|l| l.is_online).collect();
            Ok(Json(json!({
                "status": "success",
                "total": locations.len(),
                "online": online.len(),
                "locations": online,
            })))
        }
    }
}

async fn driver_document_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path((id, kind)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let kind: DocumentKind = kind.parse().map_err(ApiError::InvalidInput)?;
    let result = state.probe.resolve(&id, kind).await;
    Ok(Json(json!({ "status": "success", "document": result })))
}

async fn list_users_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Value>, ApiError> {
    let outcome: FetchOutcome<UserProfile> = state
        .reader
        .fetch(collections::USER_PROFILES, Some(&OrderBy::desc("updatedAt")))
        .await?;
    let users = match outcome {
        FetchOutcome::Empty => return Ok(empty_envelope("users", collections::USER_PROFILES)),
        FetchOutcome::Records(users) => users,
    };
    let total = users.len();
    let filtered: Vec<&UserProfile> = users
        .iter()
        .filter(|u| match query.search.as_deref() {
            None | Some("") => true,
            Some(term) => u.matches_search(term),
        })
        .collect();
    Ok(Json(json!({
        "status": "success",
        "total": total,
        "filtered": filtered.len(),
        "users": filtered,
    })))
}

async fn list_requests_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<Value>, ApiError> {
    let outcome: FetchOutcome<EmergencyRequest> = state
        .reader
        .fetch(
            collections::EMERGENCY_REQUESTS,
            Some(&OrderBy::desc("createdAt")),
        )
        .await?;
    match outcome {
        FetchOutcome::Empty => Ok(empty_envelope("requests", collections::EMERGENCY_REQUESTS)),
        FetchOutcome::Records(requests) => Ok(Json(json!({
            "status": "success",
            "total": requests.len(),
            "requests": requests,
        }))),
    }
}

async fn recent_requests_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut requests = state.live.snapshot().await;
    requests.truncate(query.limit.unwrap_or(RECENT_WINDOW));
    let entries: Vec<Value> = requests
        .iter()
        .map(|r| {
            json!({
                "request": r,
                "locationText": r.location.display(),
            })
        })
        .collect();
    Ok(Json(json!({ "status": "success", "requests": entries })))
}

async fn accept_request_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut requests: Vec<EmergencyRequest> = state
        .reader
        .fetch(collections::EMERGENCY_REQUESTS, None)
        .await?
        .into_records();
    state
        .gateway
        .accept_request(collections::EMERGENCY_REQUESTS, &mut requests, &id)
        .await?;
    respond_with_request(&requests, &id)
}

async fn complete_request_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut requests: Vec<EmergencyRequest> = state
        .reader
        .fetch(collections::EMERGENCY_REQUESTS, None)
        .await?
        .into_records();
    state
        .gateway
        .complete_request(collections::EMERGENCY_REQUESTS, &mut requests, &id)
        .await?;
    respond_with_request(&requests, &id)
}

async fn cancel_request_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    body: Option<Json<CancelBody>>,
) -> Result<Json<Value>, ApiError> {
    let reason = body.as_ref().and_then(|b| b.reason.clone());
    let mut requests: Vec<EmergencyRequest> = state
        .reader
        .fetch(collections::EMERGENCY_REQUESTS, None)
        .await?
        .into_records();
    state
        .gateway
        .cancel_request(
            collections::EMERGENCY_REQUESTS,
            &mut requests,
            &id,
            reason.as_deref(),
        )
        .await?;
    respond_with_request(&requests, &id)
}

fn respond_with_request(requests: &[EmergencyRequest], id: &str) -> Result<Json<Value>, ApiError> {
    let request = requests
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| ApiError::NotFound(format!("request '{}'", id)))?;
    Ok(Json(json!({ "status": "success", "request": request })))
}

async fn list_bookings_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<Value>, ApiError> {
    let outcome: FetchOutcome<AmbulanceBooking> = state
        .reader
        .fetch(
            collections::AMBULANCE_BOOKINGS,
            Some(&OrderBy::desc("createdAt")),
        )
        .await?;
    match outcome {
        FetchOutcome::Empty => Ok(empty_envelope("bookings", collections::AMBULANCE_BOOKINGS)),
        FetchOutcome::Records(bookings) => Ok(Json(json!({
            "status": "success",
            "total": bookings.len(),
            "bookings": bookings,
        }))),
    }
}

async fn complete_booking_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut bookings: Vec<AmbulanceBooking> = state
        .reader
        .fetch(collections::AMBULANCE_BOOKINGS, None)
        .await?
        .into_records();
    state
        .gateway
        .complete_request(collections::AMBULANCE_BOOKINGS, &mut bookings, &id)
        .await?;
    respond_with_booking(&bookings, &id)
}

async fn cancel_booking_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    body: Option<Json<CancelBody>>,
) -> Result<Json<Value>, ApiError> {
    let reason = body.as_ref().and_then(|b| b.reason.clone());
    let mut bookings: Vec<AmbulanceBooking> = state
        .reader
        .fetch(collections::AMBULANCE_BOOKINGS, None)
        .await?
        .into_records();
    state
        .gateway
        .cancel_request(
            collections::AMBULANCE_BOOKINGS,
            &mut bookings,
            &id,
            reason.as_deref(),
        )
        .await?;
    respond_with_booking(&bookings, &id)
}

fn respond_with_booking(bookings: &[AmbulanceBooking], id: &str) -> Result<Json<Value>, ApiError> {
    let booking = bookings
        .iter()
        .find(|b| b.id == id)
        .ok_or_else(|| ApiError::NotFound(format!("booking '{}'", id)))?;
    Ok(Json(json!({ "status": "success", "booking": booking })))
}

async fn stats_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<Value>, ApiError> {
    let emergencies: Vec<EmergencyRequest> = state
        .reader
        .fetch(collections::EMERGENCY_REQUESTS, None)
        .await?
        .into_records();
    let bookings: Vec<AmbulanceBooking> = state
        .reader
        .fetch(collections::AMBULANCE_BOOKINGS, None)
        .await?
        .into_records();
    let drivers: Vec<DriverProfile> = state
        .reader
        .fetch(collections::DRIVER_PROFILES, None)
        .await?
        .into_records();
    let users: Vec<UserProfile> = state
        .reader
        .fetch(collections::USER_PROFILES, None)
        .await?
        .into_records();
    let admins = state
        .reader
        .fetch_documents(collections::ADMINS, None)
        .await?;

    let stats = DashboardStats::compute(
        &emergencies,
        &bookings,
        &drivers,
        &users,
        admins.len() as u64,
    );
    Ok(Json(json!({ "status": "success", "stats": stats })))
}

async fn daily_report_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let from = parse_date(range.from.as_deref())?;
    let to = parse_date(range.to.as_deref())?;

    let mut emergencies: Vec<EmergencyRequest> = state
        .reader
        .fetch(
            collections::EMERGENCY_REQUESTS,
            Some(&OrderBy::desc("createdAt")),
        )
        .await?
        .into_records();
    let mut ambulance: Vec<AmbulanceBooking> = state
        .reader
        .fetch(
            collections::AMBULANCE_REQUESTS,
            Some(&OrderBy::desc("createdAt")),
        )
        .await?
        .into_records();

    emergencies.retain(|r| in_range(r.created_at.map(|t| t.date_naive()), from, to));
    ambulance.retain(|b| in_range(b.created_at.map(|t| t.date_naive()), from, to));

    let days = daily_series(&emergencies, &ambulance);
    Ok(Json(json!({
        "status": "success",
        "emergencies": emergencies.len(),
        "ambulanceRequests": ambulance.len(),
        "days": days,
    })))
}

async fn status_report_handler(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<Value>, ApiError> {
    let emergencies: Vec<EmergencyRequest> = state
        .reader
        .fetch(collections::EMERGENCY_REQUESTS, None)
        .await?
        .into_records();
    let bookings: Vec<AmbulanceBooking> = state
        .reader
        .fetch(collections::AMBULANCE_BOOKINGS, None)
        .await?
        .into_records();

    let emergency_statuses = group_counts(&emergencies, |r| r.status.to_string());
    let booking_types = group_counts(&bookings, |b| b.emergency_type.clone());
    Ok(Json(json!({
        "status": "success",
        "emergencyStatuses": as_labelled_counts(emergency_statuses),
        "bookingTypes": as_labelled_counts(booking_types),
    })))
}

fn as_labelled_counts(groups: Vec<(String, u64)>) -> Vec<Value> {
    groups
        .into_iter()
        .map(|(name, count)| json!({ "name": name, "count": count }))
        .collect()
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match value {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::InvalidInput(format!("invalid date '{}'", raw))),
    }
}

fn in_range(date: Option<NaiveDate>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    let Some(date) = date else {
        // records without a creation time only appear in unbounded reports
        return from.is_none() && to.is_none();
    };
    if let Some(from) = from {
        if date < from {
            return false;
        }
    }
    if let Some(to) = to {
        if date > to {
            return false;
        }
    }
    true
}

// --------- Router and server ---------

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/version", get(version_handler))
        .route("/api/v1/auth/login", post(login_handler))
        .route("/api/v1/drivers", get(list_drivers_handler))
        .route("/api/v1/drivers/locations", get(driver_locations_handler))
        .route("/api/v1/drivers/:id/approve", post(approve_driver_handler))
        .route("/api/v1/drivers/:id/reject", post(reject_driver_handler))
        .route(
            "/api/v1/drivers/:id/documents/:kind",
            get(driver_document_handler),
        )
        .route("/api/v1/users", get(list_users_handler))
        .route("/api/v1/requests", get(list_requests_handler))
        .route("/api/v1/requests/recent", get(recent_requests_handler))
        .route("/api/v1/requests/:id/accept", post(accept_request_handler))
        .route(
            "/api/v1/requests/:id/complete",
            post(complete_request_handler),
        )
        .route("/api/v1/requests/:id/cancel", post(cancel_request_handler))
        .route("/api/v1/bookings", get(list_bookings_handler))
        .route(
            "/api/v1/bookings/:id/complete",
            post(complete_booking_handler),
        )
        .route("/api/v1/bookings/:id/cancel", post(cancel_booking_handler))
        .route("/api/v1/stats", get(stats_handler))
        .route("/api/v1/reports/daily", get(daily_report_handler))
        .route("/api/v1/reports/status", get(status_report_handler))
        .with_state(state)
        .layer(cors)
}

pub async fn start_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to address: {}", addr))?;
    info!("dispatch admin API listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("admin API server failed")?;
    info!("dispatch admin API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

/// Registers the order keys the screens rely on; new deployments start with
/// them in place, existing ones re-register harmlessly.
pub async fn register_startup_indexes(store: &Arc<dyn DocumentStore>) -> StoreResult<()> {
    for &(collection, field) in STARTUP_INDEXES {
        store.create_index(collection, field).await?;
    }
    Ok(())
}

/// Opens the filesystem object store, creating its root if needed.
pub async fn open_object_store(root: &str, base_url: &str) -> StoreResult<storage::FsObjectStore> {
    if !FsPath::new(root).exists() {
        tokio::fs::create_dir_all(root).await?;
    }
    Ok(storage::FsObjectStore::new(root, base_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_the_right_status_codes() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                ApiError::Unauthorized("x".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
            (
                ApiError::InvalidInput("x".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Transition(TransitionError::InvalidTransition {
                    from: "completed".to_string(),
                    to: "cancelled".to_string(),
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::Transition(TransitionError::UnknownRecord("r".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Internal("x".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn date_range_filter_is_inclusive() {
        let from = Some(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        let to = Some(NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
        let inside = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let outside = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert!(in_range(Some(inside), from, to));
        assert!(!in_range(Some(outside), from, to));
        assert!(!in_range(None, from, to));
        assert!(in_range(None, None, None));
    }

    #[test]
    fn dates_parse_or_reject_cleanly() {
        assert_eq!(parse_date(None).unwrap(), None);
        assert_eq!(
            parse_date(Some("2025-04-01")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 1)
        );
        assert!(parse_date(Some("04/01/2025")).is_err());
    }
}
