// models/src/errors.rs

use std::io;
pub use thiserror::Error;

/// Errors surfaced by the document and object store seams.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("collection '{collection}' has no index supporting order by '{field}'")]
    MissingIndex { collection: String, field: String },
    #[error("document '{id}' not found in collection '{collection}'")]
    NotFound { collection: String, id: String },
    #[error("no object at path '{0}'")]
    ObjectNotFound(String),
    #[error("write rejected: {0}")]
    WriteFailed(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[cfg(feature = "sled-errors")]
    #[error(transparent)]
    Sled(#[from] sled::Error),
    #[error("storage error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(format!("JSON processing error: {}", err))
    }
}

impl StoreError {
    /// True for the degraded-query case the collection reader recovers from
    /// by retrying without ordering.
    pub fn is_missing_index(&self) -> bool {
        matches!(self, StoreError::MissingIndex { .. })
    }
}

/// A validation error raised by the strict decode path. The lenient path
/// substitutes documented defaults instead of raising these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required display field is absent from the stored document.
    #[error("required field '{0}' is missing")]
    MissingField(String),
    /// A field is present but holds an unexpected JSON type.
    #[error("field '{field}' has unexpected type, expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A status string outside the known vocabulary.
    #[error("unknown status value '{0}'")]
    InvalidStatus(String),
    /// A priority string outside the known vocabulary.
    #[error("unknown priority value '{0}'")]
    InvalidPriority(String),
    /// A timestamp field that none of the supported representations decode.
    #[error("field '{0}' holds an undecodable timestamp")]
    InvalidTimestamp(String),
    /// A location field that none of the supported shapes decode.
    #[error("field '{0}' holds an undecodable location")]
    InvalidLocation(String),
    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHashingFailed,
}

/// A type alias for a `Result` that returns a `StoreError` on failure.
pub type StoreResult<T> = Result<T, StoreError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
