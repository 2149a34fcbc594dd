//! Membership ledger for joined classes and quizzes
//!
//! Provides the join/list/leave contract the screens build on:
//! - Per-kind collections, newest first, unique by `code`
//! - Whole-collection read-modify-write, serialized per storage key
//! - A fire-and-forget notice (log entry + reminder) after each new join
//!
//! The boolean and collection methods never fail outward. Their `try_*`
//! counterparts carry the cause for callers that need to tell an existing
//! membership apart from a broken store.

use crate::clock::{Clock, SystemClock};
use crate::collection::{self, KeyLocks};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::notifications::NotificationLog;
use crate::notifier::{Notifier, TracingNotifier};
use crate::types::{JoinOutcome, Kind, MembershipRecord, NotificationEntry};
use campus_store::KeyValueStore;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Title of the on-demand test reminder
pub const TEST_TITLE: &str = "New Notification";
/// Body of the on-demand test reminder
pub const TEST_BODY: &str = "This is a test notification";

/// Membership ledger
pub struct MembershipLedger {
    store: Arc<dyn KeyValueStore>,
    notifications: Arc<NotificationLog>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: LedgerConfig,
    locks: Arc<KeyLocks>,
    /// Join notices not yet awaited by `settle`; the tasks are detached
    side_effects: Mutex<Vec<JoinHandle<()>>>,
}

impl fmt::Debug for MembershipLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MembershipLedger")
            .field("config", &self.config)
            .field("notifier", &self.notifier)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl MembershipLedger {
    /// Create ledger over `store`
    ///
    /// Reminders go to a [`TracingNotifier`] and time comes from the
    /// [`SystemClock`] until replaced. `config` is trusted as given; use
    /// [`try_new`](Self::try_new) for configuration read from outside.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, config: LedgerConfig) -> Self {
        let locks = Arc::new(KeyLocks::default());
        let notifications = Arc::new(NotificationLog::with_locks(
            Arc::clone(&store),
            config.notifications_key.clone(),
            Arc::clone(&locks),
        ));

        Self {
            store,
            notifications,
            notifier: Arc::new(TracingNotifier),
            clock: Arc::new(SystemClock),
            config,
            locks,
            side_effects: Mutex::new(Vec::new()),
        }
    }

    /// Create ledger over `store` after validating `config`
    ///
    /// # Errors
    /// - `LedgerError::Config` if a storage key is empty or shared
    pub fn try_new(
        store: Arc<dyn KeyValueStore>,
        config: LedgerConfig,
    ) -> Result<Self, LedgerError> {
        config.validate()?;
        Ok(Self::new(store, config))
    }

    /// With reminder scheduler
    #[inline]
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// With clock
    #[inline]
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Notification log this ledger appends to
    #[inline]
    #[must_use]
    pub fn notifications(&self) -> &NotificationLog {
        &self.notifications
    }

    /// Join `record` into the `kind` collection
    ///
    /// # Returns
    /// - `JoinOutcome::Added` if the record was prepended and persisted
    /// - `JoinOutcome::AlreadyJoined` if its code is present; nothing changes
    ///
    /// # Errors
    /// - `LedgerError::InvalidArgument` if `record.code` is empty
    /// - `LedgerError::Storage` / `LedgerError::Decode` on persistence failure
    pub async fn try_join(
        &self,
        kind: Kind,
        record: MembershipRecord,
    ) -> Result<JoinOutcome, LedgerError> {
        if record.code.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "membership code must not be empty".to_string(),
            ));
        }

        let key = self.config.key_for(kind);
        let guard = self.locks.lock(key).await;

        let mut existing: Vec<MembershipRecord> = collection::load(&*self.store, key).await?;
        if existing.iter().any(|r| r.code == record.code) {
            return Ok(JoinOutcome::AlreadyJoined);
        }

        let name = record.name.clone();
        existing.insert(0, record);
        collection::save(&*self.store, key, &existing).await?;
        drop(guard);

        tracing::debug!(%kind, name = %name, size = existing.len(), "membership added");
        self.dispatch_join_notice(kind, &name).await;
        Ok(JoinOutcome::Added)
    }

    /// Join `record` into the `kind` collection
    ///
    /// `true` only when the record was added. An existing code, an empty
    /// code and a storage failure all yield `false`.
    pub async fn join(&self, kind: Kind, record: MembershipRecord) -> bool {
        let code = record.code.clone();
        match self.try_join(kind, record).await {
            Ok(JoinOutcome::Added) => true,
            Ok(JoinOutcome::AlreadyJoined) => {
                tracing::debug!(%kind, code = %code, "already joined");
                false
            }
            Err(e) => {
                tracing::error!(%kind, code = %code, error = %e, "error joining {kind}");
                false
            }
        }
    }

    /// Persisted collection for `kind`, newest first
    ///
    /// # Errors
    /// - `LedgerError::Storage` / `LedgerError::Decode` on read failure
    pub async fn try_list(&self, kind: Kind) -> Result<Vec<MembershipRecord>, LedgerError> {
        collection::load(&*self.store, self.config.key_for(kind)).await
    }

    /// Persisted collection for `kind`, newest first; empty on any failure
    pub async fn list(&self, kind: Kind) -> Vec<MembershipRecord> {
        self.try_list(kind).await.unwrap_or_else(|e| {
            tracing::error!(%kind, error = %e, "error loading {kind} memberships");
            Vec::new()
        })
    }

    /// Remove every record with `code` from the `kind` collection
    ///
    /// Returns the number of records removed. Removing an absent code still
    /// rewrites the collection and succeeds.
    ///
    /// # Errors
    /// - `LedgerError::Storage` / `LedgerError::Decode` on persistence failure
    pub async fn try_leave(&self, kind: Kind, code: &str) -> Result<usize, LedgerError> {
        let key = self.config.key_for(kind);
        let _guard = self.locks.lock(key).await;

        let mut existing: Vec<MembershipRecord> = collection::load(&*self.store, key).await?;
        let before = existing.len();
        existing.retain(|r| r.code != code);
        collection::save(&*self.store, key, &existing).await?;

        let removed = before - existing.len();
        tracing::debug!(%kind, code, removed, "membership left");
        Ok(removed)
    }

    /// Remove `code` from the `kind` collection
    ///
    /// `true` whenever the collection was written back, matched or not.
    pub async fn leave(&self, kind: Kind, code: &str) -> bool {
        match self.try_leave(kind, code).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(%kind, code, error = %e, "error leaving {kind}");
                false
            }
        }
    }

    /// Alias of [`leave`](Self::leave)
    #[inline]
    pub async fn remove(&self, kind: Kind, code: &str) -> bool {
        self.leave(kind, code).await
    }

    /// Join a class
    pub async fn join_class(&self, record: MembershipRecord) -> bool {
        self.join(Kind::Class, record).await
    }

    /// Joined classes, newest first
    pub async fn joined_classes(&self) -> Vec<MembershipRecord> {
        self.list(Kind::Class).await
    }

    /// Leave a class
    pub async fn leave_class(&self, code: &str) -> bool {
        self.leave(Kind::Class, code).await
    }

    /// Join a quiz
    pub async fn join_quiz(&self, record: MembershipRecord) -> bool {
        self.join(Kind::Quiz, record).await
    }

    /// Joined quizzes, newest first
    pub async fn joined_quizzes(&self) -> Vec<MembershipRecord> {
        self.list(Kind::Quiz).await
    }

    /// Exit a quiz
    pub async fn exit_quiz(&self, code: &str) -> bool {
        self.leave(Kind::Quiz, code).await
    }

    /// Schedule the reminder the notifications screen sends on demand
    ///
    /// Nothing is written to the log. `false` if the notifier refuses.
    pub async fn send_test_notification(&self) -> bool {
        match self
            .notifier
            .schedule_notification(TEST_TITLE, TEST_BODY, self.config.reminder_delay())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to schedule test notification");
                false
            }
        }
    }

    /// Wait for every dispatched join notice to finish
    ///
    /// Returns how many notices were awaited. Notices run to completion
    /// whether or not this is called, even after the ledger is dropped.
    pub async fn settle(&self) -> usize {
        let mut awaited = 0;
        loop {
            let pending = std::mem::take(&mut *self.side_effects.lock().await);
            if pending.is_empty() {
                return awaited;
            }
            for handle in pending {
                awaited += 1;
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "join notice task failed");
                }
            }
        }
    }

    /// Append the join entry and schedule the reminder on a background task
    async fn dispatch_join_notice(&self, kind: Kind, name: &str) {
        let entry = NotificationEntry::joined(kind, name, &self.clock.now());
        let log = Arc::clone(&self.notifications);
        let notifier = Arc::clone(&self.notifier);
        let delay = self.config.reminder_delay();

        let handle = tokio::spawn(async move {
            if let Err(e) = log.append(entry.clone()).await {
                tracing::warn!(id = %entry.id, error = %e, "failed to record join notification");
            }
            if let Err(e) = notifier
                .schedule_notification(&entry.title, &entry.body, delay)
                .await
            {
                tracing::warn!(id = %entry.id, error = %e, "failed to schedule join reminder");
            }
        });

        let mut tasks = self.side_effects.lock().await;
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_store::MemoryStore;

    fn ledger() -> MembershipLedger {
        MembershipLedger::new(Arc::new(MemoryStore::new()), LedgerConfig::new())
    }

    #[tokio::test]
    async fn join_list_leave_scenario() {
        let ledger = ledger();
        let record = MembershipRecord::new("CS101", "Intro to Algorithms");

        assert!(ledger.join_class(record.clone()).await);
        assert_eq!(ledger.joined_classes().await, vec![record.clone()]);
        assert!(!ledger.join_class(record).await);
        assert!(ledger.leave_class("CS101").await);
        assert!(ledger.joined_classes().await.is_empty());
    }

    #[tokio::test]
    async fn empty_code_is_rejected() {
        let ledger = ledger();

        let err = ledger
            .try_join(Kind::Quiz, MembershipRecord::new("", "Nameless"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
        assert!(!ledger.join_quiz(MembershipRecord::new("", "Nameless")).await);
        assert!(ledger.joined_quizzes().await.is_empty());
    }

    #[tokio::test]
    async fn kinds_are_independent() {
        let ledger = ledger();

        assert!(ledger.join_class(MembershipRecord::new("X1", "Class X")).await);
        assert!(ledger.join_quiz(MembershipRecord::new("X1", "Quiz X")).await);
        assert!(ledger.exit_quiz("X1").await);

        assert_eq!(ledger.joined_classes().await.len(), 1);
        assert!(ledger.joined_quizzes().await.is_empty());
    }

    #[tokio::test]
    async fn code_match_is_case_sensitive() {
        let ledger = ledger();

        assert!(ledger.join_class(MembershipRecord::new("cs101", "a")).await);
        assert!(ledger.join_class(MembershipRecord::new("CS101", "b")).await);
        assert_eq!(ledger.try_leave(Kind::Class, "Cs101").await.unwrap(), 0);
        assert_eq!(ledger.joined_classes().await.len(), 2);
    }

    #[tokio::test]
    async fn join_records_notice() {
        let ledger = ledger();
        assert!(ledger.join_quiz(MembershipRecord::new("Q1", "Quiz 1")).await);
        ledger.settle().await;

        let entries = ledger.notifications().entries().await;
        assert_eq!(entries.len(), 1);
        assert!(entries[0].id.starts_with("quiz-"));
        assert_eq!(entries[0].title, "Joined quiz");
        assert_eq!(entries[0].body, "Quiz 1");
        assert!(entries[0].unread);
    }

    #[tokio::test]
    async fn duplicate_join_has_no_notice() {
        let ledger = ledger();
        let record = MembershipRecord::new("Q1", "Quiz 1");

        assert_eq!(
            ledger.try_join(Kind::Quiz, record.clone()).await.unwrap(),
            JoinOutcome::Added
        );
        assert_eq!(
            ledger.try_join(Kind::Quiz, record).await.unwrap(),
            JoinOutcome::AlreadyJoined
        );
        ledger.settle().await;

        assert_eq!(ledger.notifications().entries().await.len(), 1);
    }

    #[tokio::test]
    async fn settle_without_pending_returns() {
        assert_eq!(ledger().settle().await, 0);
    }

    #[tokio::test]
    async fn settle_awaits_each_notice_once() {
        let ledger = ledger();
        assert!(ledger.join_class(MembershipRecord::new("A", "a")).await);

        assert_eq!(ledger.settle().await, 1);
        assert_eq!(ledger.settle().await, 0);
        assert_eq!(ledger.notifications().entries().await.len(), 1);
    }

    #[test]
    fn try_new_rejects_shared_keys() {
        let mut config = LedgerConfig::new();
        config.quizzes_key = config.notifications_key.clone();

        let err = MembershipLedger::try_new(Arc::new(MemoryStore::new()), config).unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
        assert!(MembershipLedger::try_new(Arc::new(MemoryStore::new()), LedgerConfig::new()).is_ok());
    }
}
