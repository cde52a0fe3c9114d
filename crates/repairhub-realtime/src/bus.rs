//! In-memory pub/sub bus for newly inserted notification records.
//!
//! Single-node counterpart of a managed realtime transport: the service
//! facade publishes every stored record, and each connected session holds
//! a broadcast receiver. Channels may narrow delivery (per-user), but
//! subscribers still apply their own access check; broadcast-by-role
//! records cannot be narrowed by recipient id alone.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tokio::sync::broadcast;

use repairhub_core::types::UserId;
use repairhub_entity::notification::Notification;

/// Channel carrying every inserted record.
pub const FEED_CHANNEL: &str = "notifications";

/// In-memory insert bus.
#[derive(Debug)]
pub struct NotificationBus {
    /// Channel name → broadcast sender.
    channels: RwLock<HashMap<String, broadcast::Sender<Notification>>>,
    /// Buffer size for newly created channels.
    buffer_size: usize,
}

impl NotificationBus {
    /// Create a new bus.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            buffer_size,
        }
    }

    /// Publish a record to a channel.
    ///
    /// Records published to a channel nobody subscribes to are dropped.
    pub async fn publish(&self, channel: &str, record: Notification) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(channel) {
            let _ = tx.send(record);
        }
    }

    /// Subscribe to a channel, returning a receiver.
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<Notification> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);
        tx.subscribe()
    }

    /// The per-user narrowed channel name.
    pub fn user_channel(user_id: UserId) -> String {
        format!("user:{user_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repairhub_core::types::{NotificationId, TaskId};
    use repairhub_entity::notification::{NewNotification, NotificationKind};

    fn record() -> Notification {
        NewNotification {
            recipient_id: Some(UserId::new()),
            for_role: None,
            title: "New repair task".to_string(),
            message: "New repair task added: Printer-7 - Paper jam".to_string(),
            kind: NotificationKind::NewTask,
            task_id: Some(TaskId::new()),
        }
        .into_record(NotificationId::new(), chrono::Utc::now())
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_record() {
        let bus = NotificationBus::new(16);
        let mut rx = bus.subscribe(FEED_CHANNEL).await;

        let published = record();
        bus.publish(FEED_CHANNEL, published.clone()).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, published.id);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let bus = NotificationBus::new(16);
        // No channel exists yet; the record is dropped without error.
        bus.publish(FEED_CHANNEL, record()).await;
    }

    #[tokio::test]
    async fn test_channels_are_independent() {
        let bus = NotificationBus::new(16);
        let user = UserId::new();
        let mut narrowed = bus.subscribe(&NotificationBus::user_channel(user)).await;

        bus.publish(FEED_CHANNEL, record()).await;
        assert!(narrowed.try_recv().is_err());
    }
}
