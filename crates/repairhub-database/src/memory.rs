//! In-memory event store for single-node development and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use repairhub_core::AppResult;
use repairhub_core::error::AppError;
use repairhub_core::types::{NotificationId, PageRequest, UserId};
use repairhub_entity::notification::{NewNotification, Notification};
use repairhub_entity::user::UserRole;

use crate::store::NotificationStore;

/// Notification store held entirely in process memory.
///
/// Mirrors the PostgreSQL backend's semantics, including the
/// all-or-nothing batch read transition. Not durable.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    records: RwLock<Vec<Notification>>,
}

impl MemoryNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, draft: NewNotification) -> AppResult<Notification> {
        draft.validate()?;

        let record = draft.into_record(NotificationId::new(), Utc::now());
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn mark_read(&self, id: NotificationId) -> AppResult<()> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.read = true;
                Ok(())
            }
            None => Err(AppError::not_found(format!(
                "notification {id} does not exist"
            ))),
        }
    }

    async fn mark_many_read(&self, ids: &[NotificationId]) -> AppResult<()> {
        let mut records = self.records.write().await;

        // Validate the whole batch before mutating anything.
        for id in ids {
            if !records.iter().any(|r| r.id == *id) {
                return Err(AppError::not_found(
                    "batch contains unknown notification ids; no records were changed",
                ));
            }
        }

        for record in records.iter_mut() {
            if ids.contains(&record.id) {
                record.read = true;
            }
        }
        Ok(())
    }

    async fn find_for_recipient(
        &self,
        user_id: UserId,
        role: UserRole,
        page: &PageRequest,
    ) -> AppResult<Vec<Notification>> {
        let records = self.records.read().await;
        let mut visible: Vec<Notification> = records
            .iter()
            .filter(|r| r.visible_to(user_id, role))
            .cloned()
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(visible
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn count_unread(&self, user_id: UserId, role: UserRole) -> AppResult<i64> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.visible_to(user_id, role) && r.is_unread())
            .count() as i64)
    }

    async fn cleanup_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.created_at >= cutoff);
        Ok((before - records.len()) as u64)
    }
}
