//! Whole-collection JSON persistence and per-key mutation locks

use crate::error::LedgerError;
use campus_store::KeyValueStore;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Read the JSON array stored under `key`
///
/// A missing or empty value is an empty collection. Anything else,
/// whitespace included, must parse as a JSON array.
pub(crate) async fn load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, LedgerError> {
    match store.get(key).await? {
        Some(raw) if !raw.is_empty() => {
            serde_json::from_str(&raw).map_err(|e| LedgerError::decode(key, e))
        }
        _ => Ok(Vec::new()),
    }
}

/// Replace the JSON array stored under `key`
pub(crate) async fn save<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), LedgerError> {
    let encoded = serde_json::to_string(items).map_err(|e| LedgerError::encode(key, e))?;
    store.set(key, encoded).await?;
    Ok(())
}

/// One async mutex per storage key
///
/// Read-modify-write of a collection holds the key's guard for the whole
/// cycle, so concurrent mutations of one key apply in turn instead of
/// overwriting each other.
#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub(crate) async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = Arc::clone(self.locks.entry(key.to_string()).or_default().value());
        mutex.lock_owned().await
    }
}
