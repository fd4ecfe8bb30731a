// storage/src/object_store.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use serde::Serialize;

use models::errors::{StoreError, StoreResult};

/// A blob reference returned by folder listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    pub name: String,
    pub path: String,
}

/// The blob-storage seam, addressed by hierarchical path. Holds the PDF
/// documents drivers upload during registration.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// A retrievable URL for the object at `path`, or
    /// `StoreError::ObjectNotFound`.
    async fn download_url(&self, path: &str) -> StoreResult<String>;

    /// Objects directly under a folder prefix; `ObjectNotFound` when the
    /// folder itself is absent.
    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectRef>>;
}

/// Filesystem-backed object store: blobs live under `root`, URLs are issued
/// against `base_url`. Paths are confined to the root.
pub struct FsObjectStore {
    root: PathBuf,
    base_url: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        FsObjectStore {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        if Path::new(path)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(StoreError::Backend(format!(
                "object path '{}' escapes the store root",
                path
            )));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn download_url(&self, path: &str) -> StoreResult<String> {
        let full = self.resolve(path)?;
        match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_file() => Ok(format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )),
            _ => {
                debug!("no object at {:?}", full);
                Err(StoreError::ObjectNotFound(path.to_string()))
            }
        }
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectRef>> {
        let folder = self.resolve(prefix)?;
        let mut entries = match tokio::fs::read_dir(&folder).await {
            Ok(entries) => entries,
            Err(_) => return Err(StoreError::ObjectNotFound(prefix.to_string())),
        };
        let mut refs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                let name = entry.file_name().to_string_lossy().to_string();
                refs.push(ObjectRef {
                    path: format!("{}/{}", prefix.trim_end_matches('/'), name),
                    name,
                });
            }
        }
        refs.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(refs)
    }
}
