// models/src/booking.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::document::{Document, FromDocument};
use crate::errors::ValidationResult;
use crate::fields;
use crate::location::Location;
use crate::status::RequestStatus;

/// A bystander-initiated ambulance booking. Separate collection from
/// [`crate::EmergencyRequest`], same status vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbulanceBooking {
    pub id: String,
    pub requester_id: String,
    pub patient_name: String,
    pub patient_phone: String,
    pub location: Location,
    pub emergency_type: String,
    pub status: RequestStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub driver_id: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub injured_persons: Option<u64>,
    pub notes: Option<String>,
}

impl FromDocument for AmbulanceBooking {
    fn from_document(doc: &Document) -> Self {
        let data = &doc.data;
        AmbulanceBooking {
            id: doc.id.clone(),
            requester_id: fields::str_or(data, "requesterId", "Unknown"),
            patient_name: fields::str_or(data, "patientName", "Unknown Patient"),
            patient_phone: fields::str_or(data, "patientPhone", "No phone"),
            location: Location::from_value(data.get("location")),
            emergency_type: fields::str_or(data, "emergencyType", "Unknown"),
            status: RequestStatus::parse_or_default(
                data.get("status").and_then(|v| v.as_str()),
            ),
            created_at: fields::timestamp(data, "createdAt"),
            completed_at: fields::timestamp(data, "completedAt"),
            cancellation_reason: fields::opt_str(data, "cancellationReason"),
            driver_id: fields::opt_str(data, "driverId"),
            driver_name: fields::opt_str(data, "driverName"),
            driver_phone: fields::opt_str(data, "driverPhone"),
            injured_persons: fields::opt_u64(data, "injuredPersons"),
            notes: fields::opt_str(data, "notes"),
        }
    }

    fn validate(doc: &Document) -> ValidationResult<Self> {
        let data = &doc.data;
        let status: RequestStatus = fields::require_str(data, "status")?.parse()?;
        Ok(AmbulanceBooking {
            id: doc.id.clone(),
            requester_id: fields::require_str(data, "requesterId")?,
            patient_name: fields::require_str(data, "patientName")?,
            patient_phone: fields::require_str(data, "patientPhone")?,
            location: Location::validate(data, "location")?,
            emergency_type: fields::require_str(data, "emergencyType")?,
            status,
            created_at: fields::validate_timestamp(data, "createdAt")?,
            completed_at: fields::validate_timestamp(data, "completedAt")?,
            cancellation_reason: fields::opt_str(data, "cancellationReason"),
            driver_id: fields::opt_str(data, "driverId"),
            driver_name: fields::opt_str(data, "driverName"),
            driver_phone: fields::opt_str(data, "driverPhone"),
            injured_persons: fields::opt_u64(data, "injuredPersons"),
            notes: fields::opt_str(data, "notes"),
        })
    }
}
