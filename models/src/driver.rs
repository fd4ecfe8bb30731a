// models/src/driver.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::document::{Document, FromDocument};
use crate::errors::ValidationResult;
use crate::fields;
use crate::status::DriverStatus;

/// A driver registration as shown on the review screens. Created and deleted
/// by the driver-facing app; this service only reads it and mutates
/// `status` / `isVerified` through the mutation gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub license_number: String,
    pub is_verified: bool,
    pub status: DriverStatus,
    pub rating: f64,
    pub total_trips: u64,
    pub is_online: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DriverProfile {
    /// Case-insensitive match against name, email, or license number.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.full_name.to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
            || self.license_number.to_lowercase().contains(&term)
    }
}

impl FromDocument for DriverProfile {
    fn from_document(doc: &Document) -> Self {
        let data = &doc.data;
        DriverProfile {
            id: doc.id.clone(),
            full_name: fields::str_or(data, "fullName", "Unknown Driver"),
            email: fields::str_or(data, "email", "No email"),
            phone_number: fields::str_or(data, "phoneNumber", "No phone"),
            license_number: fields::str_or(data, "licenseNumber", "Not provided"),
            is_verified: fields::bool_or(data, "isVerified", false),
            status: DriverStatus::parse_or_default(
                data.get("status").and_then(|v| v.as_str()),
            ),
            rating: fields::f64_or(data, "rating", 0.0),
            total_trips: fields::u64_or(data, "totalTrips", 0),
            is_online: fields::bool_or(data, "isOnline", false),
            created_at: fields::timestamp(data, "createdAt"),
            updated_at: fields::timestamp(data, "updatedAt"),
        }
    }

    fn validate(doc: &Document) -> ValidationResult<Self> {
        let data = &doc.data;
        let status: DriverStatus = fields::require_str(data, "status")?.parse()?;
        Ok(DriverProfile {
            id: doc.id.clone(),
            full_name: fields::require_str(data, "fullName")?,
            email: fields::require_str(data, "email")?,
            phone_number: fields::require_str(data, "phoneNumber")?,
            license_number: fields::require_str(data, "licenseNumber")?,
            is_verified: fields::require_bool(data, "isVerified")?,
            status,
            rating: fields::f64_or(data, "rating", 0.0),
            total_trips: fields::u64_or(data, "totalTrips", 0),
            is_online: fields::bool_or(data, "isOnline", false),
            created_at: fields::validate_timestamp(data, "createdAt")?,
            updated_at: fields::validate_timestamp(data, "updatedAt")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use serde_json::json;

    #[test]
    fn lenient_decode_fills_every_display_field() {
        let doc = Document::new("d1", json!({}));
        let driver = DriverProfile::from_document(&doc);
        assert_eq!(driver.full_name, "Unknown Driver");
        assert_eq!(driver.email, "No email");
        assert_eq!(driver.phone_number, "No phone");
        assert_eq!(driver.license_number, "Not provided");
        assert_eq!(driver.status, DriverStatus::Pending);
        assert!(!driver.is_verified);
        assert_eq!(driver.rating, 0.0);
        assert_eq!(driver.total_trips, 0);
    }

    #[test]
    fn lenient_decode_keeps_real_values() {
        let doc = Document::new(
            "d2",
            json!({
                "fullName": "Ravindu Perera",
                "email": "ravindu@example.com",
                "phoneNumber": "+94 71 000 0000",
                "licenseNumber": "B1234567",
                "isVerified": true,
                "status": "approved",
                "rating": 4.6,
                "totalTrips": 112,
                "createdAt": "2025-01-12T08:00:00Z"
            }),
        );
        let driver = DriverProfile::from_document(&doc);
        assert_eq!(driver.full_name, "Ravindu Perera");
        assert_eq!(driver.status, DriverStatus::Approved);
        assert!(driver.is_verified);
        assert_eq!(driver.total_trips, 112);
        assert!(driver.created_at.is_some());
    }

    #[test]
    fn strict_decode_reports_the_substitution() {
        let doc = Document::new("d3", json!({ "email": "x@y.z" }));
        assert_eq!(
            DriverProfile::validate(&doc).unwrap_err(),
            ValidationError::MissingField("fullName".to_string())
        );
    }

    #[test]
    fn search_matches_name_email_and_license() {
        let doc = Document::new(
            "d4",
            json!({ "fullName": "Amara Silva", "email": "amara@x.lk", "licenseNumber": "B9" }),
        );
        let driver = DriverProfile::from_document(&doc);
        assert!(driver.matches_search("amara"));
        assert!(driver.matches_search("X.LK"));
        assert!(driver.matches_search("b9"));
        assert!(!driver.matches_search("nadeesha"));
    }
}
