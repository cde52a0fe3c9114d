//! # repairhub-realtime
//!
//! Realtime delivery for the in-app notification feed: an in-memory
//! publish/subscribe bus carrying newly inserted records, logical-event
//! deduplication, and the per-session feed reconciler.

pub mod bus;
pub mod dedup;
pub mod reconciler;

pub use bus::{FEED_CHANNEL, NotificationBus};
pub use reconciler::{FeedState, SessionFeed};
