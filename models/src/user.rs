// models/src/user.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::document::{Document, FromDocument};
use crate::errors::ValidationResult;
use crate::fields;

/// A consumer profile with the medical snapshot shown to dispatchers.
/// Read-only from this service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    pub emergency_contact: String,
    pub emergency_email: String,
    pub blood_type: String,
    pub allergies: String,
    pub medical_conditions: String,
    pub medications: String,
    pub is_active: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.full_name.to_lowercase().contains(&term)
            || self.emergency_email.to_lowercase().contains(&term)
            || self.emergency_contact.to_lowercase().contains(&term)
    }
}

impl FromDocument for UserProfile {
    fn from_document(doc: &Document) -> Self {
        let data = &doc.data;
        UserProfile {
            id: doc.id.clone(),
            full_name: fields::str_or(data, "fullName", "Unknown User"),
            emergency_contact: fields::str_or(data, "emergencyContact", "No contact"),
            emergency_email: fields::str_or(data, "emergencyEmail", "No email"),
            blood_type: fields::str_or(data, "bloodType", "Unknown"),
            allergies: fields::str_or(data, "allergies", "None"),
            medical_conditions: fields::str_or(data, "medicalConditions", "None"),
            medications: fields::str_or(data, "medications", "None"),
            is_active: fields::bool_or(data, "isActive", true),
            updated_at: fields::timestamp(data, "updatedAt"),
        }
    }

    fn validate(doc: &Document) -> ValidationResult<Self> {
        let data = &doc.data;
        Ok(UserProfile {
            id: doc.id.clone(),
            full_name: fields::require_str(data, "fullName")?,
            emergency_contact: fields::require_str(data, "emergencyContact")?,
            emergency_email: fields::require_str(data, "emergencyEmail")?,
            blood_type: fields::require_str(data, "bloodType")?,
            allergies: fields::str_or(data, "allergies", "None"),
            medical_conditions: fields::str_or(data, "medicalConditions", "None"),
            medications: fields::str_or(data, "medications", "None"),
            is_active: fields::bool_or(data, "isActive", true),
            updated_at: fields::validate_timestamp(data, "updatedAt")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn medical_fields_default_rather_than_fail() {
        let user = UserProfile::from_document(&Document::new("u1", json!({})));
        assert_eq!(user.full_name, "Unknown User");
        assert_eq!(user.blood_type, "Unknown");
        assert_eq!(user.allergies, "None");
        assert_eq!(user.medical_conditions, "None");
        assert_eq!(user.medications, "None");
        assert!(user.is_active);
    }

    #[test]
    fn explicit_inactive_flag_is_preserved() {
        let user =
            UserProfile::from_document(&Document::new("u2", json!({ "isActive": false })));
        assert!(!user.is_active);
    }
}
