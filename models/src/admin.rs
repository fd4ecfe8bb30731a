// models/src/admin.rs

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::document::{Document, FromDocument};
use crate::errors::ValidationResult;
use crate::fields;

/// An operator account in the `admins` collection. Only the password hash is
/// ever stored or serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl AdminProfile {
    /// Hashes a plaintext password for storage.
    pub fn hash_password(password: &str) -> Result<String, BcryptError> {
        hash(password, DEFAULT_COST)
    }

    /// Verifies a plaintext password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        verify(password, &self.password_hash).unwrap_or(false)
    }

    /// Builds a new admin record with a fresh id and hashed password.
    pub fn new(email: &str, full_name: &str, password: &str) -> Result<Self, BcryptError> {
        Ok(AdminProfile {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            password_hash: Self::hash_password(password)?,
            created_at: Some(Utc::now()),
        })
    }

    /// The stored-document shape for this record.
    pub fn to_document(&self) -> Document {
        let created = self
            .created_at
            .map(|ts| serde_json::json!(ts.to_rfc3339()))
            .unwrap_or(serde_json::Value::Null);
        Document::new(
            self.id.clone(),
            serde_json::json!({
                "email": self.email,
                "fullName": self.full_name,
                "passwordHash": self.password_hash,
                "createdAt": created,
            }),
        )
    }
}

impl FromDocument for AdminProfile {
    fn from_document(doc: &Document) -> Self {
        let data = &doc.data;
        AdminProfile {
            id: doc.id.clone(),
            email: fields::str_or(data, "email", "No email"),
            full_name: fields::str_or(data, "fullName", "Administrator"),
            password_hash: fields::str_or(data, "passwordHash", ""),
            created_at: fields::timestamp(data, "createdAt"),
        }
    }

    fn validate(doc: &Document) -> ValidationResult<Self> {
        let data = &doc.data;
        Ok(AdminProfile {
            id: doc.id.clone(),
            email: fields::require_str(data, "email")?,
            full_name: fields::str_or(data, "fullName", "Administrator"),
            password_hash: fields::require_str(data, "passwordHash")?,
            created_at: fields::validate_timestamp(data, "createdAt")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let admin = AdminProfile::new("ops@example.com", "Ops", "s3cret-pass").unwrap();
        assert!(admin.verify_password("s3cret-pass"));
        assert!(!admin.verify_password("wrong"));
        assert_ne!(admin.password_hash, "s3cret-pass");
    }

    #[test]
    fn document_round_trip_keeps_the_hash_private_field() {
        let admin = AdminProfile::new("ops@example.com", "Ops", "pw").unwrap();
        let doc = admin.to_document();
        let restored = AdminProfile::from_document(&doc);
        assert_eq!(restored.email, admin.email);
        assert!(restored.verify_password("pw"));
        // serialized form must not leak the hash
        let json = serde_json::to_value(&restored).unwrap();
        assert!(json.get("passwordHash").is_none());
    }
}
