//! Notification service and recipient resolution rules.

pub mod content;
pub mod rules;
pub mod service;

pub use rules::{Address, RecipientResolver};
pub use service::NotificationService;
