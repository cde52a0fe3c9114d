//! The notification service facade.
//!
//! The single entry point producers call with typed events. Composes the
//! recipient resolver, the event store, the insert bus, and the external
//! webhook dispatcher; all dependencies are injected at construction.

use std::sync::Arc;

use tracing::info;

use repairhub_core::AppResult;
use repairhub_core::types::{TaskId, UserId};
use repairhub_database::NotificationStore;
use repairhub_entity::event::{Actor, NotificationEvent};
use repairhub_entity::notification::{NewNotification, Notification};
use repairhub_entity::task::TaskStatus;
use repairhub_entity::user::UserRole;
use repairhub_realtime::bus::{FEED_CHANNEL, NotificationBus};
use repairhub_webhook::{WebhookDispatcher, render};

use super::content;
use super::rules::RecipientResolver;

/// Creates, persists, and fans out notifications for business events.
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    bus: Arc<NotificationBus>,
    webhook: Arc<WebhookDispatcher>,
    resolver: RecipientResolver,
}

impl NotificationService {
    /// Create a new service over its injected collaborators.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        bus: Arc<NotificationBus>,
        webhook: Arc<WebhookDispatcher>,
    ) -> Self {
        Self {
            store,
            bus,
            webhook,
            resolver: RecipientResolver::new(),
        }
    }

    /// A new repair task was created.
    pub async fn notify_new_task(
        &self,
        actor: Actor,
        device_name: impl Into<String>,
        issue: impl Into<String>,
        task_id: TaskId,
    ) -> AppResult<Vec<Notification>> {
        self.emit(NotificationEvent::NewTask {
            actor,
            device_name: device_name.into(),
            issue: issue.into(),
            task_id,
        })
        .await
    }

    /// A repair task reached a terminal status.
    pub async fn notify_status_change(
        &self,
        actor: Actor,
        device_name: impl Into<String>,
        issue: impl Into<String>,
        new_status: TaskStatus,
        task_id: TaskId,
    ) -> AppResult<Vec<Notification>> {
        self.emit(NotificationEvent::StatusChange {
            actor,
            device_name: device_name.into(),
            issue: issue.into(),
            new_status,
            task_id,
        })
        .await
    }

    /// A repair task was assigned to a technician.
    #[allow(clippy::too_many_arguments)]
    pub async fn notify_task_assigned(
        &self,
        actor: Actor,
        technician_id: Option<UserId>,
        technician_name: impl Into<String>,
        technician_role: UserRole,
        device_name: impl Into<String>,
        issue: impl Into<String>,
        task_id: TaskId,
    ) -> AppResult<Vec<Notification>> {
        self.emit(NotificationEvent::TaskAssigned {
            actor,
            technician_id,
            technician_name: technician_name.into(),
            technician_role,
            device_name: device_name.into(),
            issue: issue.into(),
            task_id,
        })
        .await
    }

    /// A user profile was updated.
    pub async fn notify_user_updated(
        &self,
        actor: Actor,
        email: impl Into<String>,
        full_name: impl Into<String>,
        role: UserRole,
    ) -> AppResult<Vec<Notification>> {
        self.emit(NotificationEvent::UserUpdated {
            actor,
            email: email.into(),
            full_name: full_name.into(),
            role,
        })
        .await
    }

    /// A user was deleted.
    pub async fn notify_user_deleted(
        &self,
        actor: Actor,
        email: impl Into<String>,
        full_name: impl Into<String>,
        role: UserRole,
    ) -> AppResult<Vec<Notification>> {
        self.emit(NotificationEvent::UserDeleted {
            actor,
            email: email.into(),
            full_name: full_name.into(),
            role,
        })
        .await
    }

    /// Resolve, persist, and fan out one event.
    ///
    /// Validation and store errors surface to the caller and suppress the
    /// external dispatch for this event; the webhook attempt itself is
    /// detached and can never fail the in-app path.
    pub async fn emit(&self, event: NotificationEvent) -> AppResult<Vec<Notification>> {
        let addresses = self.resolver.resolve(&event)?;
        let (title, message) = content::title_and_message(&event);

        let mut stored = Vec::with_capacity(addresses.len());
        for address in addresses {
            let draft = NewNotification {
                recipient_id: address.recipient_id,
                for_role: address.for_role,
                title: title.clone(),
                message: message.clone(),
                kind: event.kind(),
                task_id: event.task_id(),
            };

            let record = self.store.create(draft).await?;
            self.bus.publish(FEED_CHANNEL, record.clone()).await;
            if let Some(recipient) = record.recipient_id {
                self.bus
                    .publish(&NotificationBus::user_channel(recipient), record.clone())
                    .await;
            }
            stored.push(record);
        }

        self.webhook.dispatch_detached(render::embed_for(&event));

        info!(
            kind = %event.kind(),
            records = stored.len(),
            actor = %event.actor().id,
            "Notification fanned out"
        );
        Ok(stored)
    }
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService").finish()
    }
}
