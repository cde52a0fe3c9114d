//! In-app renderings for each business event.
//!
//! The in-app message is terser than the external embed but describes
//! the same event from the same payload.

use repairhub_entity::event::NotificationEvent;

/// Render the stored title and message for an event.
pub(crate) fn title_and_message(event: &NotificationEvent) -> (String, String) {
    match event {
        NotificationEvent::NewTask {
            device_name, issue, ..
        } => (
            "New repair task".to_string(),
            format!("New repair task added: {device_name} - {issue}"),
        ),
        NotificationEvent::StatusChange {
            actor,
            device_name,
            issue,
            new_status,
            ..
        } => (
            "Task status changed".to_string(),
            format!(
                "Repair task {device_name} - {issue} was marked {} by {}",
                new_status.label(),
                actor.display_name
            ),
        ),
        NotificationEvent::TaskAssigned {
            actor,
            device_name,
            issue,
            ..
        } => (
            "New task assignment".to_string(),
            format!(
                "You were assigned to repair {device_name} - {issue} by {}",
                actor.display_name
            ),
        ),
        NotificationEvent::UserUpdated {
            actor,
            email,
            full_name,
            ..
        } => (
            "User profile updated".to_string(),
            format!(
                "User {email} ({full_name}) was updated by {}",
                actor.display_name
            ),
        ),
        NotificationEvent::UserDeleted {
            actor,
            email,
            full_name,
            ..
        } => (
            "User removed".to_string(),
            format!(
                "User {email} ({full_name}) was deleted by {}",
                actor.display_name
            ),
        ),
    }
}
