//! Typed business events that produce notifications.

pub mod model;

pub use model::{Actor, NotificationEvent};
