//! # repairhub-service
//!
//! Business-logic entry point for RepairHub notifications: recipient
//! resolution rules and the notification service facade that producers
//! (task and user CRUD) call with typed events.

pub mod notification;

pub use notification::{NotificationService, RecipientResolver};
