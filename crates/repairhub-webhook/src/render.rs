//! Per-event embed rendering for the external channel.
//!
//! The external rendering is more verbose than the in-app message: it
//! spells out device, issue, actor, and a locally formatted timestamp as
//! separate fields.

use chrono::Local;

use repairhub_entity::event::NotificationEvent;
use repairhub_entity::task::TaskStatus;

use crate::embed::Embed;

const COLOR_NEW_TASK: u32 = 0x3498DB;
const COLOR_COMPLETED: u32 = 0x2ECC71;
const COLOR_UNREPAIRABLE: u32 = 0xE74C3C;
const COLOR_ASSIGNED: u32 = 0xF1C40F;
const COLOR_USER_UPDATED: u32 = 0x9B59B6;
const COLOR_USER_DELETED: u32 = 0x95A5A6;
const COLOR_SELF_TEST: u32 = 0x00FF00;

/// Render a business event into its external embed.
pub fn embed_for(event: &NotificationEvent) -> Embed {
    match event {
        NotificationEvent::NewTask {
            device_name, issue, ..
        } => Embed::new("🔔 New repair task", COLOR_NEW_TASK)
            .field("📱 Device", device_name, true)
            .field("🔧 Issue", issue, true)
            .field("🕐 Time", local_timestamp(), false),

        NotificationEvent::StatusChange {
            actor,
            device_name,
            issue,
            new_status,
            ..
        } => {
            let (icon, color) = match new_status {
                TaskStatus::Completed => ("✅", COLOR_COMPLETED),
                TaskStatus::Unrepairable => ("❌", COLOR_UNREPAIRABLE),
            };
            Embed::new(format!("{icon} Task status changed"), color)
                .field("📱 Device", device_name, true)
                .field("🔧 Issue", issue, true)
                .field("📝 New status", new_status.label(), false)
                .field(
                    "👤 Changed by",
                    format!("{} ({})", actor.display_name, actor.role),
                    false,
                )
                .field("🕐 Time", local_timestamp(), false)
        }

        NotificationEvent::TaskAssigned {
            actor,
            technician_name,
            technician_role,
            device_name,
            issue,
            ..
        } => Embed::new("📋 New task assignment", COLOR_ASSIGNED)
            .field("📱 Device", device_name, true)
            .field("🔧 Issue", issue, true)
            .field(
                "👤 Assigned by",
                format!("{} ({})", actor.display_name, actor.role),
                false,
            )
            .field(
                "🔨 Assigned to",
                format!("{technician_name} ({technician_role})"),
                false,
            )
            .field("🕐 Time", local_timestamp(), false),

        NotificationEvent::UserUpdated {
            actor,
            email,
            full_name,
            role,
        } => Embed::new("👤 User profile updated", COLOR_USER_UPDATED)
            .field("📧 Email", email, true)
            .field("🪪 Name", full_name, true)
            .field("🎓 Role", role.as_str(), true)
            .field(
                "👤 Updated by",
                format!("{} ({})", actor.display_name, actor.role),
                false,
            )
            .field("🕐 Time", local_timestamp(), false),

        NotificationEvent::UserDeleted {
            actor,
            email,
            full_name,
            role,
        } => Embed::new("🗑️ User removed", COLOR_USER_DELETED)
            .field("📧 Email", email, true)
            .field("🪪 Name", full_name, true)
            .field("🎓 Role", role.as_str(), true)
            .field(
                "👤 Deleted by",
                format!("{} ({})", actor.display_name, actor.role),
                false,
            )
            .field("🕐 Time", local_timestamp(), false),
    }
}

/// The embed sent by the dispatcher's connection self-test.
pub fn self_test() -> Embed {
    Embed::new("🔧 Connection test", COLOR_SELF_TEST)
        .description("RepairHub webhook connectivity check")
        .field("🕐 Time", local_timestamp(), false)
}

/// Timestamp in the local day/month/year convention.
fn local_timestamp() -> String {
    Local::now().format("%d/%m/%Y %H:%M:%S").to_string()
}
