//! Notification domain entities.

pub mod identity;
pub mod kind;
pub mod model;

pub use identity::EventIdentity;
pub use kind::NotificationKind;
pub use model::{NewNotification, Notification};
