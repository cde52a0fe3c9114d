//! Notification kind enumeration.

use serde::{Deserialize, Serialize};

/// The closed set of business events a notification can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A new repair task was created.
    NewTask,
    /// A repair task reached a terminal status.
    StatusChange,
    /// A repair task was assigned to a technician.
    TaskAssigned,
    /// A user profile was updated.
    UserUpdated,
    /// A user was deleted.
    UserDeleted,
}

impl NotificationKind {
    /// Return the kind as its wire/storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewTask => "new_task",
            Self::StatusChange => "status_change",
            Self::TaskAssigned => "task_assigned",
            Self::UserUpdated => "user_updated",
            Self::UserDeleted => "user_deleted",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
