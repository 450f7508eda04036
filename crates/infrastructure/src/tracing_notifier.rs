use async_trait::async_trait;
use opportune_application::{Notification, Notifier};
use opportune_core::{AppResult, UserId};
use tokio::sync::Mutex;

/// Notifier that writes deliveries to the tracing subscriber.
///
/// Stands in for a real delivery channel in development setups; callers
/// treat delivery as fire-and-forget either way.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Creates the notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, recipient: UserId, notification: Notification) -> AppResult<()> {
        tracing::info!(
            %recipient,
            title = %notification.title,
            severity = ?notification.severity,
            "notification delivered"
        );
        Ok(())
    }
}

/// Notifier that records deliveries for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<(UserId, Notification)>>,
}

impl RecordingNotifier {
    /// Creates an empty recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the recorded deliveries.
    pub async fn deliveries(&self) -> Vec<(UserId, Notification)> {
        self.deliveries.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: UserId, notification: Notification) -> AppResult<()> {
        self.deliveries.lock().await.push((recipient, notification));
        Ok(())
    }
}
