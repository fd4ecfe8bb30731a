// models/src/location.rs

use serde::Serialize;
use serde_json::Value;

use crate::errors::{ValidationError, ValidationResult};

/// Pickup location as stored by the consumer apps. The representation is
/// inconsistent across document ages: a geo-point map, a `[lat, lng]` pair,
/// a plain address string, or a map with an `address` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Point { lat: f64, lng: f64 },
    Address { address: String },
    /// The field was absent from the document.
    Missing,
    /// The field was present but in no shape we know how to read.
    Unknown,
}

impl Location {
    pub fn from_value(value: Option<&Value>) -> Location {
        let Some(value) = value else {
            return Location::Missing;
        };
        match value {
            Value::Null => Location::Missing,
            Value::String(s) if !s.is_empty() => Location::Address { address: s.clone() },
            Value::Array(items) if items.len() == 2 => {
                match (items[0].as_f64(), items[1].as_f64()) {
                    (Some(lat), Some(lng)) => Location::Point { lat, lng },
                    _ => Location::Unknown,
                }
            }
            Value::Object(map) => {
                let lat = map.get("_lat").or_else(|| map.get("lat")).and_then(Value::as_f64);
                let lng = map
                    .get("_long")
                    .or_else(|| map.get("lng"))
                    .or_else(|| map.get("long"))
                    .and_then(Value::as_f64);
                if let (Some(lat), Some(lng)) = (lat, lng) {
                    return Location::Point { lat, lng };
                }
                match map.get("address").and_then(Value::as_str) {
                    Some(address) if !address.is_empty() => Location::Address {
                        address: address.to_string(),
                    },
                    _ => Location::Unknown,
                }
            }
            _ => Location::Unknown,
        }
    }

    pub fn validate(data: &Value, key: &str) -> ValidationResult<Location> {
        match Location::from_value(data.get(key)) {
            Location::Unknown => Err(ValidationError::InvalidLocation(key.to_string())),
            other => Ok(other),
        }
    }

    /// Operator-facing rendering, matching what the admin screens print.
    pub fn display(&self) -> String {
        match self {
            Location::Point { lat, lng } => format!("{:.6}, {:.6}", lat, lng),
            Location::Address { address } => address.clone(),
            Location::Missing => "Location not provided".to_string(),
            Location::Unknown => "Location format unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_geo_point_maps_in_both_spellings() {
        let legacy = json!({ "location": { "_lat": 6.9271, "_long": 79.8612 } });
        let current = json!({ "location": { "lat": 6.9271, "lng": 79.8612 } });
        for doc in [legacy, current] {
            match Location::from_value(doc.get("location")) {
                Location::Point { lat, lng } => {
                    assert!((lat - 6.9271).abs() < 1e-9);
                    assert!((lng - 79.8612).abs() < 1e-9);
                }
                other => panic!("expected point, got {:?}", other),
            }
        }
    }

    #[test]
    fn reads_pairs_strings_and_address_maps() {
        assert_eq!(
            Location::from_value(Some(&json!([6.9, 79.8]))),
            Location::Point { lat: 6.9, lng: 79.8 }
        );
        assert_eq!(
            Location::from_value(Some(&json!("12 Hospital Rd"))),
            Location::Address {
                address: "12 Hospital Rd".to_string()
            }
        );
        assert_eq!(
            Location::from_value(Some(&json!({ "address": "12 Hospital Rd" }))),
            Location::Address {
                address: "12 Hospital Rd".to_string()
            }
        );
    }

    #[test]
    fn distinguishes_missing_from_unreadable() {
        assert_eq!(Location::from_value(None), Location::Missing);
        assert_eq!(Location::from_value(Some(&json!(42))), Location::Unknown);
        assert_eq!(
            Location::from_value(None).display(),
            "Location not provided"
        );
        assert_eq!(
            Location::from_value(Some(&json!(42))).display(),
            "Location format unknown"
        );
    }
}
