//! The event store trait.
//!
//! The reconciler and the notification service are injected with an
//! `Arc<dyn NotificationStore>`, so backends stay swappable and tests run
//! against the in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use repairhub_core::AppResult;
use repairhub_core::types::{NotificationId, PageRequest, UserId};
use repairhub_entity::notification::{NewNotification, Notification};
use repairhub_entity::user::UserRole;

/// Persistence operations over notification records.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Insert one record.
    ///
    /// Rejects drafts with no addressing (`Validation`) before touching
    /// the backing store. A `Database` error means the caller must not
    /// assume the write happened.
    async fn create(&self, draft: NewNotification) -> AppResult<Notification>;

    /// Idempotently transition a record to read.
    ///
    /// Unknown ids fail with `NotFound`; marking an already-read record
    /// succeeds silently.
    async fn mark_read(&self, id: NotificationId) -> AppResult<()>;

    /// Batch form of [`mark_read`](Self::mark_read), atomic as a set:
    /// either every id is marked read or none is.
    async fn mark_many_read(&self, ids: &[NotificationId]) -> AppResult<()>;

    /// Fetch the records visible to a session, newest first.
    ///
    /// A user sees everything addressed to them directly plus everything
    /// broadcast to their role.
    async fn find_for_recipient(
        &self,
        user_id: UserId,
        role: UserRole,
        page: &PageRequest,
    ) -> AppResult<Vec<Notification>>;

    /// Count the unread records visible to a session.
    async fn count_unread(&self, user_id: UserId, role: UserRole) -> AppResult<i64>;

    /// Delete records older than the cutoff. Returns how many were
    /// removed.
    async fn cleanup_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
