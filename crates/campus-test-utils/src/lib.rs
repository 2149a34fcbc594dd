//! Testing utilities for the campus workspace
//!
//! Shared test helpers, fixtures and controllable collaborators.

#![allow(missing_docs)]

use async_trait::async_trait;
use campus_ledger::{
    Clock, LedgerConfig, MembershipLedger, MembershipRecord, Notifier, NotifyError, Reminder,
};
use campus_store::{KeyValueStore, MemoryStore, StoreError};
use chrono::{DateTime, Local, TimeZone};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const FIXED_MILLIS: i64 = 1_700_000_000_000;

pub fn cs101() -> MembershipRecord {
    MembershipRecord::new("CS101", "Intro to Algorithms").with_field("lecturer", "Dr. Hopper")
}

pub fn class_record(code: &str) -> MembershipRecord {
    MembershipRecord::new(code, format!("Class {code}"))
}

pub fn quiz_record(code: &str) -> MembershipRecord {
    MembershipRecord::new(code, format!("Quiz {code}"))
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl FixedClock {
    pub fn at_millis(millis: i64) -> Self {
        Self(Local.timestamp_millis_opt(millis).unwrap())
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at_millis(FIXED_MILLIS)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Notifier remembering every request
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    scheduled: Mutex<Vec<(Reminder, Duration)>>,
}

impl RecordingNotifier {
    pub fn scheduled(&self) -> Vec<(Reminder, Duration)> {
        self.scheduled.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn schedule_notification(
        &self,
        title: &str,
        body: &str,
        delay: Duration,
    ) -> Result<(), NotifyError> {
        self.scheduled.lock().push((
            Reminder {
                title: title.to_string(),
                body: body.to_string(),
            },
            delay,
        ));
        Ok(())
    }
}

/// Notifier that refuses everything
#[derive(Debug, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn schedule_notification(
        &self,
        _title: &str,
        _body: &str,
        _delay: Duration,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected("permission denied".to_string()))
    }
}

/// Memory store whose reads or writes can be switched off, optionally for one key
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    only_key: Mutex<Option<String>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Restrict failures to `key`
    pub fn only_for(&self, key: &str) {
        *self.only_key.lock() = Some(key.to_string());
    }

    fn applies(&self, key: &str) -> bool {
        self.only_key.lock().as_deref().map_or(true, |k| k == key)
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) && self.applies(key) {
            return Err(StoreError::Unavailable(format!("read of {key} refused")));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) && self.applies(key) {
            return Err(StoreError::Unavailable(format!("write of {key} refused")));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) && self.applies(key) {
            return Err(StoreError::Unavailable(format!("remove of {key} refused")));
        }
        self.inner.remove(key).await
    }
}

/// Ledger over a fresh memory store with a recording notifier and fixed clock
pub fn setup_test_ledger() -> (MembershipLedger, Arc<MemoryStore>, Arc<RecordingNotifier>) {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let ledger = MembershipLedger::new(store.clone(), LedgerConfig::new())
        .with_notifier(notifier.clone())
        .with_clock(Arc::new(FixedClock::default()));
    (ledger, store, notifier)
}

/// Ledger over a [`FlakyStore`]
pub fn setup_flaky_ledger() -> (MembershipLedger, Arc<FlakyStore>, Arc<RecordingNotifier>) {
    let store = Arc::new(FlakyStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let ledger = MembershipLedger::new(store.clone(), LedgerConfig::new())
        .with_notifier(notifier.clone())
        .with_clock(Arc::new(FixedClock::default()));
    (ledger, store, notifier)
}
