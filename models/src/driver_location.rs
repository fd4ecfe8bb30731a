// models/src/driver_location.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::document::{Document, FromDocument};
use crate::errors::ValidationResult;
use crate::fields;

/// Last reported position of a driver, written continuously by the driver
/// app into `driver_locations`. Feeds the tracking map and the online count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverLocation {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub is_online: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FromDocument for DriverLocation {
    fn from_document(doc: &Document) -> Self {
        let data = &doc.data;
        DriverLocation {
            id: doc.id.clone(),
            lat: fields::f64_or(data, "lat", 0.0),
            lng: fields::f64_or(data, "lng", 0.0),
            is_online: fields::bool_or(data, "isOnline", false),
            updated_at: fields::timestamp(data, "updatedAt"),
        }
    }

    fn validate(doc: &Document) -> ValidationResult<Self> {
        let data = &doc.data;
        fields::require_bool(data, "isOnline")?;
        Ok(DriverLocation {
            id: doc.id.clone(),
            lat: fields::f64_or(data, "lat", 0.0),
            lng: fields::f64_or(data, "lng", 0.0),
            is_online: fields::bool_or(data, "isOnline", false),
            updated_at: fields::validate_timestamp(data, "updatedAt")?,
        })
    }
}
