// service/src/reader.rs

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use models::errors::{StoreError, ValidationError};
use models::{Document, FromDocument};
use storage::{DocumentStore, OrderBy};

/// Result of a collection fetch. `Empty` is a distinct outcome from both a
/// populated result and a fetch error, so screens can tell "no data" apart
/// from "fetch failed" (and from a later filter matching nothing).
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Records(Vec<T>),
    Empty,
}

impl<T> FetchOutcome<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, FetchOutcome::Empty)
    }

    pub fn len(&self) -> usize {
        match self {
            FetchOutcome::Records(records) => records.len(),
            FetchOutcome::Empty => 0,
        }
    }

    /// Flattens into a vector; `Empty` becomes an empty vec.
    pub fn into_records(self) -> Vec<T> {
        match self {
            FetchOutcome::Records(records) => records,
            FetchOutcome::Empty => Vec::new(),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Records(records) => {
                FetchOutcome::Records(records.into_iter().map(f).collect())
            }
            FetchOutcome::Empty => FetchOutcome::Empty,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("document '{id}' failed validation: {source}")]
    Validation {
        id: String,
        #[source]
        source: ValidationError,
    },
}

/// Fetches a collection and maps it into typed records, recovering from
/// missing-index failures by retrying without ordering.
#[derive(Clone)]
pub struct CollectionReader {
    store: Arc<dyn DocumentStore>,
}

impl CollectionReader {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        CollectionReader { store }
    }

    /// Raw documents, ordered when the store supports it. An ordered fetch
    /// that fails with a missing index degrades to an unordered fetch of the
    /// same record set; the degradation is logged, never surfaced.
    pub async fn fetch_documents(
        &self,
        collection: &str,
        order: Option<&OrderBy>,
    ) -> Result<FetchOutcome<Document>, ReadError> {
        let documents = match self.store.fetch_all(collection, order).await {
            Ok(documents) => documents,
            Err(err) if err.is_missing_index() => {
                warn!(
                    collection,
                    error = %err,
                    "ordered fetch degraded to unordered"
                );
                self.store.fetch_all(collection, None).await?
            }
            Err(err) => return Err(err.into()),
        };
        if documents.is_empty() {
            Ok(FetchOutcome::Empty)
        } else {
            Ok(FetchOutcome::Records(documents))
        }
    }

    /// Typed records via the lenient decode path: every display field is
    /// present in the output, defaulted where the document is missing it.
    pub async fn fetch<T: FromDocument>(
        &self,
        collection: &str,
        order: Option<&OrderBy>,
    ) -> Result<FetchOutcome<T>, ReadError> {
        Ok(self
            .fetch_documents(collection, order)
            .await?
            .map(|doc| T::from_document(&doc)))
    }

    /// Typed records via the strict decode path: the first malformed
    /// document aborts the fetch with a typed validation error.
    pub async fn fetch_validated<T: FromDocument>(
        &self,
        collection: &str,
        order: Option<&OrderBy>,
    ) -> Result<FetchOutcome<T>, ReadError> {
        let outcome = self.fetch_documents(collection, order).await?;
        match outcome {
            FetchOutcome::Empty => Ok(FetchOutcome::Empty),
            FetchOutcome::Records(documents) => {
                let mut records = Vec::with_capacity(documents.len());
                for doc in &documents {
                    let record = T::validate(doc).map_err(|source| ReadError::Validation {
                        id: doc.id.clone(),
                        source,
                    })?;
                    records.push(record);
                }
                Ok(FetchOutcome::Records(records))
            }
        }
    }
}
