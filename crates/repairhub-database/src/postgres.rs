//! PostgreSQL event store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use repairhub_core::AppResult;
use repairhub_core::error::{AppError, ErrorKind};
use repairhub_core::types::{NotificationId, PageRequest, UserId};
use repairhub_entity::notification::{NewNotification, Notification};
use repairhub_entity::user::UserRole;

use crate::store::NotificationStore;

/// Notification store backed by the `notifications` table.
///
/// Single-row updates rely on PostgreSQL's native atomicity; only the
/// batch read transition runs inside an explicit transaction.
#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    /// Create a new store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn create(&self, draft: NewNotification) -> AppResult<Notification> {
        draft.validate()?;

        let record = draft.into_record(NotificationId::new(), Utc::now());
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications \
                 (id, recipient_id, for_role, title, message, type, task_id, read, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(record.id)
        .bind(record.recipient_id)
        .bind(record.for_role)
        .bind(&record.title)
        .bind(&record.message)
        .bind(record.kind)
        .bind(record.task_id)
        .bind(record.read)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create notification", e))
    }

    async fn mark_read(&self, id: NotificationId) -> AppResult<()> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            "UPDATE notifications SET read = TRUE WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;

        if updated.is_none() {
            return Err(AppError::not_found(format!(
                "notification {id} does not exist"
            )));
        }
        Ok(())
    }

    async fn mark_many_read(&self, ids: &[NotificationId]) -> AppResult<()> {
        let mut unique: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        unique.sort_unstable();
        unique.dedup();
        if unique.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = ANY($1)")
            .bind(&unique)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark batch read", e))?;

        if result.rows_affected() != unique.len() as u64 {
            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back batch", e)
            })?;
            return Err(AppError::not_found(
                "batch contains unknown notification ids; no records were changed",
            ));
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit batch", e)
        })
    }

    async fn find_for_recipient(
        &self,
        user_id: UserId,
        role: UserRole,
        page: &PageRequest,
    ) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications \
             WHERE recipient_id = $1 OR for_role = $2 \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(role)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))
    }

    async fn count_unread(&self, user_id: UserId, role: UserRole) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications \
             WHERE (recipient_id = $1 OR for_role = $2) AND read = FALSE",
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))
    }

    async fn cleanup_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clean up notifications", e)
            })?;
        Ok(result.rows_affected())
    }
}
