//! # repairhub-webhook
//!
//! Best-effort external notification channel. Renders business events
//! into Discord-compatible embeds and POSTs them to a configured webhook
//! URL. Delivery is fire-and-forget: failures are logged and absorbed,
//! never surfaced to the producing business logic, and never on the
//! critical path of the in-app feed.

pub mod dispatcher;
pub mod embed;
pub mod render;

pub use dispatcher::WebhookDispatcher;
pub use embed::{Embed, EmbedField};
