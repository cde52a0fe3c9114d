//! Recipient resolution rules — who gets a record for which event.

use repairhub_core::types::UserId;
use repairhub_core::{AppError, AppResult};
use repairhub_entity::event::NotificationEvent;
use repairhub_entity::user::UserRole;

/// One addressing pair; each pair becomes one persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Direct addressee, if any.
    pub recipient_id: Option<UserId>,
    /// Role broadcast tag, if any.
    pub for_role: Option<UserRole>,
}

/// Pure mapping from a business event to its addressing pairs.
///
/// Task creation, status changes, and user changes broadcast to the
/// admin role (the actor also keeps a direct copy); assignments address
/// the technician directly. Only the admin role has a broadcast class;
/// adding one for another role is an explicit extension of
/// [`resolve`](RecipientResolver::resolve).
#[derive(Debug, Clone, Default)]
pub struct RecipientResolver;

impl RecipientResolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Resolve an event into addressing pairs.
    ///
    /// Events that resolve to no addressable recipient are rejected with
    /// a validation error before anything is written. No side effects.
    pub fn resolve(&self, event: &NotificationEvent) -> AppResult<Vec<Address>> {
        let addresses = match event {
            NotificationEvent::NewTask { actor, .. }
            | NotificationEvent::StatusChange { actor, .. }
            | NotificationEvent::UserUpdated { actor, .. }
            | NotificationEvent::UserDeleted { actor, .. } => vec![Address {
                recipient_id: Some(actor.id),
                for_role: Some(UserRole::Admin),
            }],
            NotificationEvent::TaskAssigned { technician_id, .. } => {
                let technician = technician_id.ok_or_else(|| {
                    AppError::validation("task assignment without a technician has no recipient")
                })?;
                vec![Address {
                    recipient_id: Some(technician),
                    for_role: None,
                }]
            }
        };

        if addresses
            .iter()
            .any(|a| a.recipient_id.is_none() && a.for_role.is_none())
        {
            return Err(AppError::validation(
                "event resolved to an unaddressable notification",
            ));
        }
        Ok(addresses)
    }
}
