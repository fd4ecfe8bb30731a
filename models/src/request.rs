// models/src/request.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::document::{Document, FromDocument};
use crate::errors::ValidationResult;
use crate::fields;
use crate::location::Location;
use crate::status::{Priority, RequestStatus};

/// An SOS raised from a user's own device, with the medical snapshot taken
/// at request time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyRequest {
    pub id: String,
    pub requester_id: String,
    pub patient_name: String,
    pub location: Location,
    pub status: RequestStatus,
    pub priority: Priority,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub medical_conditions: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub driver_id: Option<String>,
    pub driver_name: Option<String>,
}

impl FromDocument for EmergencyRequest {
    fn from_document(doc: &Document) -> Self {
        let data = &doc.data;
        EmergencyRequest {
            id: doc.id.clone(),
            requester_id: fields::str_or(data, "requesterId", "Unknown"),
            patient_name: fields::str_or(data, "patientName", "Anonymous"),
            location: Location::from_value(data.get("location")),
            status: RequestStatus::parse_or_default(
                data.get("status").and_then(|v| v.as_str()),
            ),
            priority: Priority::parse_or_default(
                data.get("priority").and_then(|v| v.as_str()),
            ),
            blood_type: fields::opt_str(data, "bloodType"),
            allergies: fields::opt_str(data, "allergies"),
            medical_conditions: fields::opt_str(data, "medicalConditions"),
            created_at: fields::timestamp(data, "createdAt"),
            accepted_at: fields::timestamp(data, "acceptedAt"),
            completed_at: fields::timestamp(data, "completedAt"),
            cancellation_reason: fields::opt_str(data, "cancellationReason"),
            driver_id: fields::opt_str(data, "driverId"),
            driver_name: fields::opt_str(data, "driverName"),
        }
    }

    fn validate(doc: &Document) -> ValidationResult<Self> {
        let data = &doc.data;
        let status: RequestStatus = fields::require_str(data, "status")?.parse()?;
        Ok(EmergencyRequest {
            id: doc.id.clone(),
            requester_id: fields::require_str(data, "requesterId")?,
            patient_name: fields::require_str(data, "patientName")?,
            location: Location::validate(data, "location")?,
            status,
            priority: Priority::parse_or_default(
                data.get("priority").and_then(|v| v.as_str()),
            ),
            blood_type: fields::opt_str(data, "bloodType"),
            allergies: fields::opt_str(data, "allergies"),
            medical_conditions: fields::opt_str(data, "medicalConditions"),
            created_at: fields::validate_timestamp(data, "createdAt")?,
            accepted_at: fields::validate_timestamp(data, "acceptedAt")?,
            completed_at: fields::validate_timestamp(data, "completedAt")?,
            cancellation_reason: fields::opt_str(data, "cancellationReason"),
            driver_id: fields::opt_str(data, "driverId"),
            driver_name: fields::opt_str(data, "driverName"),
        })
    }
}
