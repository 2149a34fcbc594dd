use async_trait::async_trait;
use campus_ledger::{Kind, LedgerConfig, LedgerError, MembershipLedger, MembershipRecord};
use campus_store::{KeyValueStore, StoreError};
use campus_test_utils::{
    class_record, cs101, setup_flaky_ledger, FailingNotifier, FixedClock, RecordingNotifier,
};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Store {}

    #[async_trait]
    impl KeyValueStore for Store {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
        async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
        async fn remove(&self, key: &str) -> Result<(), StoreError>;
    }
}

fn offline() -> StoreError {
    StoreError::Unavailable("offline".to_string())
}

#[tokio::test]
async fn read_failure_degrades_to_empty_and_false() {
    let mut store = MockStore::new();
    store.expect_get().returning(|_| Err(offline()));
    store.expect_set().never();

    let ledger = MembershipLedger::new(Arc::new(store), LedgerConfig::new());

    assert!(ledger.list(Kind::Class).await.is_empty());
    assert!(!ledger.join_class(cs101()).await);
    assert!(!ledger.leave_class("CS101").await);
    ledger.settle().await;
}

#[tokio::test]
async fn write_failure_on_join_has_no_side_effect() {
    let mut store = MockStore::new();
    store
        .expect_get()
        .withf(|key| key == "@joined_classes")
        .returning(|_| Ok(None));
    store
        .expect_set()
        .withf(|key, _| key == "@joined_classes")
        .times(1)
        .returning(|_, _| Err(offline()));
    store
        .expect_get()
        .withf(|key| key == "local_notifications_v1")
        .never();
    store
        .expect_set()
        .withf(|key, _| key == "local_notifications_v1")
        .never();

    let notifier = Arc::new(RecordingNotifier::default());
    let ledger = MembershipLedger::new(Arc::new(store), LedgerConfig::new())
        .with_notifier(notifier.clone());

    let err = ledger.try_join(Kind::Class, cs101()).await.unwrap_err();
    assert!(err.is_storage_failure());

    assert_eq!(ledger.settle().await, 0, "no join notice may be dispatched");
    assert!(notifier.scheduled().is_empty());
}

#[tokio::test]
async fn write_failure_on_leave_is_false() {
    let (ledger, store, _) = setup_flaky_ledger();
    assert!(ledger.join_class(cs101()).await);
    ledger.settle().await;

    store.fail_writes(true);
    assert!(!ledger.leave_class("CS101").await);

    store.fail_writes(false);
    assert_eq!(ledger.joined_classes().await, vec![cs101()]);
}

#[tokio::test]
async fn corrupt_collection_degrades() {
    let (ledger, store, _) = setup_flaky_ledger();
    store
        .set("@joined_quizzes", "{\"not\": \"an array\"}".to_string())
        .await
        .unwrap();

    assert!(ledger.joined_quizzes().await.is_empty());
    assert!(!ledger.join_quiz(class_record("Q1")).await);
    assert!(matches!(
        ledger.try_list(Kind::Quiz).await.unwrap_err(),
        LedgerError::Decode { .. }
    ));
}

#[tokio::test]
async fn notification_log_failure_does_not_fail_join() {
    let (ledger, store, notifier) = setup_flaky_ledger();
    store.only_for("local_notifications_v1");
    store.fail_writes(true);

    assert!(ledger.join_class(cs101()).await);
    ledger.settle().await;

    assert_eq!(ledger.joined_classes().await, vec![cs101()]);
    assert_eq!(notifier.scheduled().len(), 1);

    store.fail_writes(false);
    assert!(ledger.notifications().entries().await.is_empty());
}

#[tokio::test]
async fn notifier_failure_does_not_fail_join() {
    let store = Arc::new(campus_store::MemoryStore::new());
    let ledger = MembershipLedger::new(store, LedgerConfig::new())
        .with_notifier(Arc::new(FailingNotifier))
        .with_clock(Arc::new(FixedClock::default()));

    assert!(ledger.join_class(cs101()).await);
    ledger.settle().await;

    assert_eq!(ledger.notifications().entries().await.len(), 1);
}

#[tokio::test]
async fn duplicate_and_storage_failure_are_distinguishable() {
    let (ledger, store, _) = setup_flaky_ledger();
    let record = MembershipRecord::new("CS101", "Intro to Algorithms");
    assert!(ledger.join_class(record.clone()).await);

    // Boolean contract conflates the two
    assert!(!ledger.join_class(record.clone()).await);
    store.fail_reads(true);
    assert!(!ledger.join_class(record.clone()).await);

    // The diagnostic path does not
    assert!(ledger.try_join(Kind::Class, record.clone()).await.is_err());
    store.fail_reads(false);
    assert!(!ledger.try_join(Kind::Class, record).await.unwrap().is_added());
}
