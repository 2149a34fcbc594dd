//! Local notification log
//!
//! Newest-first list of notification entries persisted as one JSON array.
//! The ledger appends to it after joins; the notifications screen reads it
//! and flips read state.

use crate::collection::{self, KeyLocks};
use crate::error::LedgerError;
use crate::types::NotificationEntry;
use campus_store::KeyValueStore;
use std::fmt;
use std::sync::Arc;

/// Persisted notification log
pub struct NotificationLog {
    store: Arc<dyn KeyValueStore>,
    key: String,
    locks: Arc<KeyLocks>,
}

impl fmt::Debug for NotificationLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationLog")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl NotificationLog {
    /// Create log stored under `key`
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self::with_locks(store, key, Arc::new(KeyLocks::default()))
    }

    /// Create log sharing another component's key locks
    pub(crate) fn with_locks(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        locks: Arc<KeyLocks>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            locks,
        }
    }

    /// Storage key of the log
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Prepend `entry`
    ///
    /// # Errors
    /// - `LedgerError::Storage` / `LedgerError::Decode` if the log cannot be
    ///   read or written
    pub async fn append(&self, entry: NotificationEntry) -> Result<(), LedgerError> {
        let _guard = self.locks.lock(&self.key).await;
        let mut entries: Vec<NotificationEntry> = collection::load(&*self.store, &self.key).await?;
        tracing::debug!(id = %entry.id, "notification appended");
        entries.insert(0, entry);
        collection::save(&*self.store, &self.key, &entries).await
    }

    /// All entries, newest first
    ///
    /// # Errors
    /// - `LedgerError::Storage` / `LedgerError::Decode` on read failure
    pub async fn try_entries(&self) -> Result<Vec<NotificationEntry>, LedgerError> {
        collection::load(&*self.store, &self.key).await
    }

    /// All entries, newest first; empty if the log cannot be read
    pub async fn entries(&self) -> Vec<NotificationEntry> {
        self.try_entries().await.unwrap_or_else(|e| {
            tracing::error!(key = %self.key, error = %e, "error loading notifications");
            Vec::new()
        })
    }

    /// Number of unread entries
    pub async fn unread_count(&self) -> usize {
        self.entries().await.iter().filter(|e| e.unread).count()
    }

    /// Flip read state of entry `id`
    ///
    /// Returns the new `unread` value, or `None` if no entry has that id.
    ///
    /// # Errors
    /// - `LedgerError::Storage` / `LedgerError::Decode` on read or write failure
    pub async fn try_toggle_read(&self, id: &str) -> Result<Option<bool>, LedgerError> {
        let _guard = self.locks.lock(&self.key).await;
        let mut entries: Vec<NotificationEntry> = collection::load(&*self.store, &self.key).await?;

        let Some(entry) = entries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        entry.unread = !entry.unread;
        let unread = entry.unread;

        collection::save(&*self.store, &self.key, &entries).await?;
        Ok(Some(unread))
    }

    /// Flip read state of entry `id`; `None` if missing or not persisted
    pub async fn toggle_read(&self, id: &str) -> Option<bool> {
        match self.try_toggle_read(id).await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(key = %self.key, id, error = %e, "error toggling notification");
                None
            }
        }
    }

    /// Mark every entry read; `false` only if the log cannot be persisted
    pub async fn mark_all_read(&self) -> bool {
        let result = async {
            let _guard = self.locks.lock(&self.key).await;
            let mut entries: Vec<NotificationEntry> =
                collection::load(&*self.store, &self.key).await?;
            for entry in &mut entries {
                entry.unread = false;
            }
            collection::save(&*self.store, &self.key, &entries).await
        }
        .await;

        if let Err(e) = &result {
            tracing::error!(key = %self.key, error = %e, "error marking notifications read");
        }
        result.is_ok()
    }

    /// Persist `entries` if nothing is stored yet
    ///
    /// Returns `true` if the log was seeded.
    pub async fn seed_if_empty(&self, entries: Vec<NotificationEntry>) -> bool {
        let result: Result<bool, LedgerError> = async {
            let _guard = self.locks.lock(&self.key).await;
            if self.store.get(&self.key).await?.is_some() {
                return Ok(false);
            }
            collection::save(&*self.store, &self.key, &entries).await?;
            Ok(true)
        }
        .await;

        result.unwrap_or_else(|e| {
            tracing::warn!(key = %self.key, error = %e, "error seeding notifications");
            false
        })
    }
}

/// Starter entries shown before the student has any activity
#[must_use]
pub fn sample_notifications() -> Vec<NotificationEntry> {
    vec![
        NotificationEntry::new(
            "n1",
            "New assignment posted",
            "Machine Learning: Homework 1",
            "2h ago",
        ),
        NotificationEntry::new(
            "n2",
            "Quiz starting",
            "Quiz 1 in Algorithms starts tomorrow",
            "1d ago",
        ),
        NotificationEntry::new(
            "n3",
            "Profile updated",
            "Your profile was saved successfully",
            "3d ago",
        )
        .read(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_store::MemoryStore;

    fn log() -> NotificationLog {
        NotificationLog::new(Arc::new(MemoryStore::new()), "local_notifications_v1")
    }

    #[tokio::test]
    async fn append_is_newest_first() {
        let log = log();
        log.append(NotificationEntry::new("a", "t", "b", "now")).await.unwrap();
        log.append(NotificationEntry::new("b", "t", "b", "now")).await.unwrap();

        let ids: Vec<_> = log.entries().await.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(log.unread_count().await, 2);
    }

    #[tokio::test]
    async fn toggle_read_flips_and_reports() {
        let log = log();
        log.append(NotificationEntry::new("a", "t", "b", "now")).await.unwrap();

        assert_eq!(log.toggle_read("a").await, Some(false));
        assert_eq!(log.unread_count().await, 0);
        assert_eq!(log.toggle_read("a").await, Some(true));
        assert_eq!(log.toggle_read("missing").await, None);
    }

    #[tokio::test]
    async fn mark_all_read() {
        let log = log();
        assert!(log.seed_if_empty(sample_notifications()).await);
        assert_eq!(log.unread_count().await, 2);

        assert!(log.mark_all_read().await);
        assert_eq!(log.unread_count().await, 0);
        assert_eq!(log.entries().await.len(), 3);
    }

    #[tokio::test]
    async fn seed_only_once() {
        let log = log();
        log.append(NotificationEntry::new("a", "t", "b", "now")).await.unwrap();

        assert!(!log.seed_if_empty(sample_notifications()).await);
        assert_eq!(log.entries().await.len(), 1);
    }

    #[tokio::test]
    async fn seed_respects_stored_empty_log() {
        let log = log();
        assert!(log.mark_all_read().await);
        assert!(!log.seed_if_empty(sample_notifications()).await);
        assert!(log.entries().await.is_empty());
    }
}
