//! Notification record entity and its draft form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use repairhub_core::types::{NotificationId, TaskId, UserId};
use repairhub_core::{AppError, AppResult};

use super::identity::EventIdentity;
use super::kind::NotificationKind;

/// A persisted notification record.
///
/// Every record is addressed to a specific user (`recipient_id`), to every
/// session whose user holds a role (`for_role`), or both. `title`,
/// `message`, `kind`, `task_id`, and `created_at` are immutable after
/// creation; only `read` ever changes, and only from false to true.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier, assigned at creation.
    pub id: NotificationId,
    /// Direct addressee, if any.
    pub recipient_id: Option<UserId>,
    /// Role broadcast tag, if any. Independent of `recipient_id`.
    pub for_role: Option<crate::user::UserRole>,
    /// Short human-readable title.
    pub title: String,
    /// Human-readable body text.
    pub message: String,
    /// The business event this record describes.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: NotificationKind,
    /// Originating repair task, used for deduplication and cross-linking.
    pub task_id: Option<TaskId>,
    /// Whether the addressee has read this record.
    pub read: bool,
    /// Creation timestamp; the sole ordering key (descending).
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check whether the record is still unread.
    pub fn is_unread(&self) -> bool {
        !self.read
    }

    /// Compute the logical event identity of this record.
    pub fn identity(&self) -> EventIdentity {
        EventIdentity::from(self)
    }

    /// Check whether a session may see this record.
    ///
    /// A record is visible when it is addressed to the session's user
    /// directly, or broadcast to the session's role.
    pub fn visible_to(&self, user_id: UserId, role: crate::user::UserRole) -> bool {
        self.recipient_id == Some(user_id) || self.for_role == Some(role)
    }
}

/// A notification draft, validated before it becomes a stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    /// Direct addressee, if any.
    pub recipient_id: Option<UserId>,
    /// Role broadcast tag, if any.
    pub for_role: Option<crate::user::UserRole>,
    /// Short human-readable title.
    pub title: String,
    /// Human-readable body text.
    pub message: String,
    /// The business event this record describes.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Originating repair task, if any.
    pub task_id: Option<TaskId>,
}

impl NewNotification {
    /// Reject drafts with no addressing at all.
    ///
    /// A record with neither `recipient_id` nor `for_role` would be
    /// unaddressable and must never reach the store.
    pub fn validate(&self) -> AppResult<()> {
        if self.recipient_id.is_none() && self.for_role.is_none() {
            return Err(AppError::validation(
                "notification has neither a recipient nor a role broadcast",
            ));
        }
        Ok(())
    }

    /// Promote the draft into a stored record.
    pub fn into_record(self, id: NotificationId, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            recipient_id: self.recipient_id,
            for_role: self.for_role,
            title: self.title,
            message: self.message,
            kind: self.kind,
            task_id: self.task_id,
            read: false,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserRole;

    fn draft() -> NewNotification {
        NewNotification {
            recipient_id: Some(UserId::new()),
            for_role: None,
            title: "New repair task".to_string(),
            message: "New repair task added: Printer-7 - Paper jam".to_string(),
            kind: NotificationKind::NewTask,
            task_id: Some(TaskId::new()),
        }
    }

    #[test]
    fn test_unaddressed_draft_is_rejected() {
        let mut unaddressed = draft();
        unaddressed.recipient_id = None;
        unaddressed.for_role = None;
        let err = unaddressed.validate().unwrap_err();
        assert!(err.is_kind(repairhub_core::error::ErrorKind::Validation));
    }

    #[test]
    fn test_role_only_draft_is_valid() {
        let mut broadcast = draft();
        broadcast.recipient_id = None;
        broadcast.for_role = Some(UserRole::Admin);
        assert!(broadcast.validate().is_ok());
    }

    #[test]
    fn test_into_record_starts_unread() {
        let record = draft().into_record(NotificationId::new(), Utc::now());
        assert!(record.is_unread());
    }

    #[test]
    fn test_visibility_direct_and_broadcast() {
        let user = UserId::new();
        let other = UserId::new();
        let mut record = draft().into_record(NotificationId::new(), Utc::now());
        record.recipient_id = Some(user);
        record.for_role = Some(UserRole::Admin);

        assert!(record.visible_to(user, UserRole::Technician));
        assert!(record.visible_to(other, UserRole::Admin));
        assert!(!record.visible_to(other, UserRole::Technician));
    }

    #[test]
    fn test_kind_serializes_under_type_key() {
        let record = draft().into_record(NotificationId::new(), Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "new_task");
    }
}
