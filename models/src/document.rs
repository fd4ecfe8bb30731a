// models/src/document.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ValidationResult;

/// A raw document as returned by the document store: an id plus the stored
/// JSON object. Field access and defaulting happen in the typed records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Document {
            id: id.into(),
            data,
        }
    }
}

/// Conversion from a raw stored document into a typed record.
///
/// `from_document` is lenient: every declared display field receives either
/// the stored value or its documented default, so it never fails. `validate`
/// is the strict counterpart that reports each substitution the lenient path
/// would silently make.
pub trait FromDocument: Sized {
    fn from_document(doc: &Document) -> Self;

    fn validate(doc: &Document) -> ValidationResult<Self>;
}
