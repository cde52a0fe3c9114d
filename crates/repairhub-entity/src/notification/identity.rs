//! Logical event identity.
//!
//! The same business event can reach a session through more than one
//! path (direct write vs. role broadcast, bulk fetch vs. realtime
//! stream). Two records sharing an identity are the same event and must
//! render as one feed entry.

use repairhub_core::types::TaskId;

use super::kind::NotificationKind;
use super::model::Notification;

/// The derived tuple that identifies "the same notification".
///
/// A missing task reference participates in the identity: two records
/// both lacking `task_id` but sharing kind and message are duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventIdentity {
    /// Originating task, if any.
    pub task_id: Option<TaskId>,
    /// The business event kind.
    pub kind: NotificationKind,
    /// The rendered message text.
    pub message: String,
}

impl From<&Notification> for EventIdentity {
    fn from(record: &Notification) -> Self {
        Self {
            task_id: record.task_id,
            kind: record.kind,
            message: record.message.clone(),
        }
    }
}
