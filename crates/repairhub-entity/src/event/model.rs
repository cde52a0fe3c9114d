//! Business event payloads emitted by the task and user CRUD producers.
//!
//! Each variant carries the minimal payload needed to render both the
//! in-app message and the external webhook embed for that event.

use serde::{Deserialize, Serialize};

use repairhub_core::types::{TaskId, UserId};

use crate::notification::NotificationKind;
use crate::task::TaskStatus;
use crate::user::UserRole;

/// The user performing the action that produced an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user.
    pub id: UserId,
    /// Display name, as rendered in messages.
    pub display_name: String,
    /// The actor's role.
    pub role: UserRole,
}

/// A business event to be fanned out as notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A new repair task was created.
    NewTask {
        /// Who created the task.
        actor: Actor,
        /// The device being repaired.
        device_name: String,
        /// The reported issue.
        issue: String,
        /// The new task's id.
        task_id: TaskId,
    },
    /// A repair task reached a terminal status.
    StatusChange {
        /// Who changed the status.
        actor: Actor,
        /// The device being repaired.
        device_name: String,
        /// The reported issue.
        issue: String,
        /// The terminal status the task reached.
        new_status: TaskStatus,
        /// The task whose status changed.
        task_id: TaskId,
    },
    /// A repair task was assigned to a technician.
    TaskAssigned {
        /// Who made the assignment.
        actor: Actor,
        /// The assigned technician, when one was selected.
        technician_id: Option<UserId>,
        /// The technician's display name.
        technician_name: String,
        /// The technician's role.
        technician_role: UserRole,
        /// The device being repaired.
        device_name: String,
        /// The reported issue.
        issue: String,
        /// The assigned task.
        task_id: TaskId,
    },
    /// A user profile was updated.
    UserUpdated {
        /// Who performed the update.
        actor: Actor,
        /// The subject user's email.
        email: String,
        /// The subject user's full name.
        full_name: String,
        /// The subject user's role.
        role: UserRole,
    },
    /// A user was deleted.
    UserDeleted {
        /// Who performed the deletion.
        actor: Actor,
        /// The subject user's email.
        email: String,
        /// The subject user's full name.
        full_name: String,
        /// The subject user's role.
        role: UserRole,
    },
}

impl NotificationEvent {
    /// The notification kind this event produces.
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::NewTask { .. } => NotificationKind::NewTask,
            Self::StatusChange { .. } => NotificationKind::StatusChange,
            Self::TaskAssigned { .. } => NotificationKind::TaskAssigned,
            Self::UserUpdated { .. } => NotificationKind::UserUpdated,
            Self::UserDeleted { .. } => NotificationKind::UserDeleted,
        }
    }

    /// The originating task reference, if the event concerns one.
    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            Self::NewTask { task_id, .. }
            | Self::StatusChange { task_id, .. }
            | Self::TaskAssigned { task_id, .. } => Some(*task_id),
            Self::UserUpdated { .. } | Self::UserDeleted { .. } => None,
        }
    }

    /// The actor behind the event.
    pub fn actor(&self) -> &Actor {
        match self {
            Self::NewTask { actor, .. }
            | Self::StatusChange { actor, .. }
            | Self::TaskAssigned { actor, .. }
            | Self::UserUpdated { actor, .. }
            | Self::UserDeleted { actor, .. } => actor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let event = NotificationEvent::NewTask {
            actor: Actor {
                id: UserId::new(),
                display_name: "Alice".to_string(),
                role: UserRole::Officer,
            },
            device_name: "Printer-7".to_string(),
            issue: "Paper jam".to_string(),
            task_id: TaskId::new(),
        };
        assert_eq!(event.kind(), NotificationKind::NewTask);
        assert!(event.task_id().is_some());
    }

    #[test]
    fn test_user_events_have_no_task() {
        let event = NotificationEvent::UserDeleted {
            actor: Actor {
                id: UserId::new(),
                display_name: "Root".to_string(),
                role: UserRole::Admin,
            },
            email: "tech@example.com".to_string(),
            full_name: "Gone Person".to_string(),
            role: UserRole::Technician,
        };
        assert_eq!(event.task_id(), None);
    }
}
