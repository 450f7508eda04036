use async_trait::async_trait;
use opportune_core::{AppResult, UserId};
use serde::{Deserialize, Serialize};

/// Severity attached to an outbound notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSeverity {
    /// Routine update.
    Info,
    /// Positive outcome.
    Success,
    /// Negative outcome or required action.
    Warning,
}

/// One outbound notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Short notification title.
    pub title: String,
    /// Notification body.
    pub message: String,
    /// Display severity.
    pub severity: NotificationSeverity,
    /// Optional deep link into the consuming surface.
    pub link: Option<String>,
}

/// Port for outbound notification delivery.
///
/// Delivery is fire-and-forget relative to lifecycle transitions: a failed
/// delivery never rolls back or retries an already-committed state change.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notification to one recipient.
    async fn notify(&self, recipient: UserId, notification: Notification) -> AppResult<()>;
}
