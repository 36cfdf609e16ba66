//! Notification seam between the poller and the external delivery layer.

use async_trait::async_trait;

use seatwatch_core::{TrackedSection, UserId};

/// Errors from notification delivery. The poller logs and absorbs these;
/// a failed delivery never aborts a sweep.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Receives closed-to-open transitions for delivery to a user.
///
/// The chat layer implements this; formatting and transport are its
/// concern. `item` carries the watch identity plus the just-observed
/// status (seat count included).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify_open(&self, user: UserId, item: &TrackedSection) -> Result<(), SinkError>;
}

/// Sink that only logs, for running the worker without a delivery layer.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify_open(&self, user: UserId, item: &TrackedSection) -> Result<(), SinkError> {
        tracing::info!(
            user,
            crn = %item.crn,
            label = %item.label(),
            seats = item.seats_available,
            waitlist_open = item.waitlist_open,
            "section opened"
        );
        Ok(())
    }
}
