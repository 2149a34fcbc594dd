//! In-process key-value store

use crate::{KeyValueStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;

/// Concurrent in-memory store
///
/// Nothing survives the process. Used as the default backend in tests and
/// for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no key is held
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_get_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("absent").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn memory_set_overwrites() {
        let store = MemoryStore::new();
        store.set("k", "1".to_string()).await.unwrap();
        store.set("k", "2".to_string()).await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn memory_remove() {
        let store = MemoryStore::new();
        store.set("k", "v".to_string()).await.unwrap();
        store.remove("k").await.unwrap();
        store.remove("never-set").await.unwrap();

        assert!(store.get("k").await.unwrap().is_none());
    }
}
