//! Campus Ledger - joined classes, joined quizzes and local notifications
//!
//! Keeps the student's memberships on the device:
//! - Two independent collections (classes, quizzes), newest first, unique by code
//! - A notification log the join path appends to
//! - A reminder scheduled shortly after every new join
//!
//! All state lives in a [`campus_store::KeyValueStore`] as JSON arrays, one
//! key per collection.
//!
//! # Example
//!
//! ```rust,ignore
//! use campus_ledger::{LedgerConfig, MembershipLedger, MembershipRecord};
//! use campus_store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let ledger = MembershipLedger::new(Arc::new(MemoryStore::new()), LedgerConfig::new());
//!
//! assert!(ledger.join_class(MembershipRecord::new("CS101", "Intro to Algorithms")).await);
//! assert_eq!(ledger.joined_classes().await.len(), 1);
//! assert!(ledger.leave_class("CS101").await);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod clock;
mod collection;
pub mod config;
pub mod error;
pub mod ledger;
pub mod notifications;
pub mod notifier;
pub mod types;

// Re-exports for convenience
pub use clock::{display_time, Clock, SystemClock, TIME_FORMAT};
pub use config::{
    LedgerConfig, DEFAULT_CLASSES_KEY, DEFAULT_NOTIFICATIONS_KEY, DEFAULT_QUIZZES_KEY,
};
pub use error::{LedgerError, NotifyError};
pub use ledger::{MembershipLedger, TEST_BODY, TEST_TITLE};
pub use notifications::{sample_notifications, NotificationLog};
pub use notifier::{ChannelNotifier, Notifier, Reminder, TracingNotifier};
pub use types::{JoinOutcome, Kind, MembershipRecord, NotificationEntry};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the ledger
    pub use crate::{
        Kind, LedgerConfig, MembershipLedger, MembershipRecord, NotificationEntry, Notifier,
    };
    pub use campus_store::KeyValueStore;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
