//! Error types for the campus ledger
//!
//! None of these cross the boolean/collection boundary of
//! [`MembershipLedger`](crate::MembershipLedger); they travel the internal
//! `try_*` path so the cause can be logged and inspected.

use campus_store::StoreError;

/// Main ledger error type
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Caller passed an unusable record or argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Underlying store failed
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Persisted value is not the expected JSON array
    #[error("failed to decode {key}: {source}")]
    Decode {
        /// Storage key being read
        key: String,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Collection could not be encoded
    #[error("failed to encode {key}: {source}")]
    Encode {
        /// Storage key being written
        key: String,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Configuration is unusable
    #[error("configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    /// Check if the failure came from persistence rather than the caller
    #[inline]
    #[must_use]
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Self::Storage(_) | Self::Decode { .. } | Self::Encode { .. }
        )
    }

    /// Create decode error for key
    pub fn decode(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            key: key.into(),
            source,
        }
    }

    /// Create encode error for key
    pub fn encode(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Encode {
            key: key.into(),
            source,
        }
    }
}

/// Reminder scheduling errors
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Nobody is listening for reminders anymore
    #[error("reminder channel closed")]
    ChannelClosed,

    /// Scheduler refused the reminder
    #[error("reminder rejected: {0}")]
    Rejected(String),
}
