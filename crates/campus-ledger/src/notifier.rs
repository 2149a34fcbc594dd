//! Local reminder scheduling
//!
//! The ledger asks a [`Notifier`] for a short-delay reminder after every
//! successful join. Delivery is the notifier's business; the ledger never
//! waits on it and never fails because of it.

use crate::error::NotifyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tokio::sync::mpsc;

/// Reminder delivered to the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Headline
    pub title: String,
    /// Body text
    pub body: String,
}

/// Reminder scheduling service
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Schedule a reminder to fire after `delay`
    async fn schedule_notification(
        &self,
        title: &str,
        body: &str,
        delay: Duration,
    ) -> Result<(), NotifyError>;
}

/// Notifier that only records the request in the trace
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn schedule_notification(
        &self,
        title: &str,
        body: &str,
        delay: Duration,
    ) -> Result<(), NotifyError> {
        tracing::info!(title, body, ?delay, "reminder scheduled");
        Ok(())
    }
}

/// Notifier delivering reminders over a channel once their delay elapses
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Reminder>,
}

impl ChannelNotifier {
    /// Create notifier and the receiving end of its reminders
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Reminder>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn schedule_notification(
        &self,
        title: &str,
        body: &str,
        delay: Duration,
    ) -> Result<(), NotifyError> {
        if self.sender.is_closed() {
            return Err(NotifyError::ChannelClosed);
        }

        let reminder = Reminder {
            title: title.to_string(),
            body: body.to_string(),
        };
        let sender = self.sender.clone();

        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if sender.send(reminder).is_err() {
                tracing::warn!("reminder dropped: receiver gone");
            }
        });

        Ok(())
    }
}
