// models/src/fields.rs

//! Lenient and strict accessors for fields of schemaless stored documents.
//!
//! The store round-trips whatever the consumer apps wrote, so field presence
//! and representation vary across document ages. The `*_or` accessors
//! substitute the documented default; the `require_*` accessors report the
//! same condition as a typed error.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::errors::{ValidationError, ValidationResult};

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn str_or(data: &Value, key: &str, default: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => default.to_string(),
    }
}

pub fn opt_str(data: &Value, key: &str) -> Option<String> {
    match data.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

pub fn f64_or(data: &Value, key: &str, default: f64) -> f64 {
    data.get(key).and_then(Value::as_f64).unwrap_or(default)
}

pub fn u64_or(data: &Value, key: &str, default: u64) -> u64 {
    data.get(key).and_then(Value::as_u64).unwrap_or(default)
}

pub fn opt_u64(data: &Value, key: &str) -> Option<u64> {
    data.get(key).and_then(Value::as_u64)
}

pub fn bool_or(data: &Value, key: &str, default: bool) -> bool {
    data.get(key).and_then(Value::as_bool).unwrap_or(default)
}

pub fn require_str(data: &Value, key: &str) -> ValidationResult<String> {
    match data.get(key) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(key.to_string())),
        Some(Value::String(s)) if s.is_empty() => {
            Err(ValidationError::MissingField(key.to_string()))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ValidationError::TypeMismatch {
            field: key.to_string(),
            expected: "string",
            found: type_name(other),
        }),
    }
}

pub fn require_bool(data: &Value, key: &str) -> ValidationResult<bool> {
    match data.get(key) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(key.to_string())),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(ValidationError::TypeMismatch {
            field: key.to_string(),
            expected: "bool",
            found: type_name(other),
        }),
    }
}

/// Decode a timestamp from any representation the store is known to return:
/// an RFC 3339 string, an epoch number (values too large to be plausible
/// seconds are read as milliseconds), or a `{seconds, nanos}` map.
pub fn decode_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let raw = n.as_i64()?;
            if raw.abs() >= 100_000_000_000 {
                Utc.timestamp_millis_opt(raw).single()
            } else {
                Utc.timestamp_opt(raw, 0).single()
            }
        }
        Value::Object(map) => {
            let seconds = map.get("seconds").and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("nanos"))
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32;
            Utc.timestamp_opt(seconds, nanos).single()
        }
        _ => None,
    }
}

/// Lenient timestamp access: absent or undecodable fields become `None`.
pub fn timestamp(data: &Value, key: &str) -> Option<DateTime<Utc>> {
    data.get(key).and_then(decode_timestamp)
}

/// Strict timestamp access: present-but-undecodable fields are an error,
/// absent fields stay `None` (the store never guarantees them).
pub fn validate_timestamp(data: &Value, key: &str) -> ValidationResult<Option<DateTime<Utc>>> {
    match data.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => decode_timestamp(value)
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidTimestamp(key.to_string())),
    }
}
