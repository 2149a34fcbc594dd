//! Ledger configuration
//!
//! Loaded from TOML; every field is optional and falls back to the defaults
//! the app has always used on device.
//!
//! ```toml
//! classes_key = "@joined_classes"
//! quizzes_key = "@joined_quizzes"
//! notifications_key = "local_notifications_v1"
//! reminder_delay_ms = 1000
//! ```

use crate::error::LedgerError;
use crate::types::Kind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default key of the joined-classes collection
pub const DEFAULT_CLASSES_KEY: &str = "@joined_classes";
/// Default key of the joined-quizzes collection
pub const DEFAULT_QUIZZES_KEY: &str = "@joined_quizzes";
/// Default key of the notification log
pub const DEFAULT_NOTIFICATIONS_KEY: &str = "local_notifications_v1";

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Storage key of the joined-classes collection
    pub classes_key: String,
    /// Storage key of the joined-quizzes collection
    pub quizzes_key: String,
    /// Storage key of the notification log
    pub notifications_key: String,
    /// Delay before the join reminder fires
    pub reminder_delay_ms: u64,
}

impl LedgerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With key prefix applied to all three storage keys
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: &str) -> Self {
        self.classes_key = format!("{prefix}{}", self.classes_key);
        self.quizzes_key = format!("{prefix}{}", self.quizzes_key);
        self.notifications_key = format!("{prefix}{}", self.notifications_key);
        self
    }

    /// With reminder delay
    #[inline]
    #[must_use]
    pub fn with_reminder_delay(mut self, delay: Duration) -> Self {
        self.reminder_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Reminder delay as a duration
    #[inline]
    #[must_use]
    pub fn reminder_delay(&self) -> Duration {
        Duration::from_millis(self.reminder_delay_ms)
    }

    /// Storage key of the collection for `kind`
    #[inline]
    #[must_use]
    pub fn key_for(&self, kind: Kind) -> &str {
        match kind {
            Kind::Class => &self.classes_key,
            Kind::Quiz => &self.quizzes_key,
        }
    }

    /// Check keys are non-empty and pairwise distinct
    ///
    /// # Errors
    /// - `LedgerError::Config` naming the offending key
    pub fn validate(&self) -> Result<(), LedgerError> {
        let keys = [
            ("classes_key", &self.classes_key),
            ("quizzes_key", &self.quizzes_key),
            ("notifications_key", &self.notifications_key),
        ];

        for (field, key) in &keys {
            if key.is_empty() {
                return Err(LedgerError::Config(format!("{field} must not be empty")));
            }
        }

        for (i, (field_a, a)) in keys.iter().enumerate() {
            for (field_b, b) in &keys[i + 1..] {
                if a == b {
                    return Err(LedgerError::Config(format!(
                        "{field_a} and {field_b} share storage key '{a}'"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// - `LedgerError::Config` on syntax errors, unknown fields or invalid keys
    pub fn from_toml_str(raw: &str) -> Result<Self, LedgerError> {
        let config: Self = toml::from_str(raw).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration file at `path`
    ///
    /// # Errors
    /// - `LedgerError::Config` if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LedgerError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            classes_key: DEFAULT_CLASSES_KEY.to_string(),
            quizzes_key: DEFAULT_QUIZZES_KEY.to_string(),
            notifications_key: DEFAULT_NOTIFICATIONS_KEY.to_string(),
            reminder_delay_ms: 1_000,
        }
    }
}
