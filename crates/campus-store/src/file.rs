//! File-backed key-value store
//!
//! All keys live in one JSON object on disk (`{"key": "value", ...}`), the
//! same shape a mobile async storage keeps per app. Writes go to a sibling
//! temp file first and are renamed over the document.

use crate::{KeyValueStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Default document name inside a data directory
pub const DEFAULT_FILE_NAME: &str = "campus-store.json";

type Document = BTreeMap<String, String>;

/// Durable store backed by a single JSON document
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write of the document
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create store for the document at `path`
    ///
    /// The file is not touched until the first operation.
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create store using [`DEFAULT_FILE_NAME`] inside `dir`
    #[inline]
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_FILE_NAME))
    }

    /// Path of the backing document
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Document, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(StoreError::io_error(&self.path, e)),
        };

        if raw.trim().is_empty() {
            return Ok(Document::new());
        }

        serde_json::from_str(&raw).map_err(|e| StoreError::corrupt(&self.path, e.to_string()))
    }

    async fn persist(&self, doc: &Document) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io_error(parent, e))?;
        }

        let encoded = serde_json::to_string_pretty(doc)
            .map_err(|e| StoreError::corrupt(&self.path, e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, encoded)
            .await
            .map_err(|e| StoreError::io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io_error(&self.path, e))?;

        tracing::trace!(path = %self.path.display(), keys = doc.len(), "store document written");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        Ok(doc.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        doc.insert(key.to_string(), value);
        self.persist(&doc).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        if doc.remove(key).is_some() {
            self.persist(&doc).await?;
        }
        Ok(())
    }
}
