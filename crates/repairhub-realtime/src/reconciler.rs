//! Per-session feed reconciliation.
//!
//! Each connected session owns a [`SessionFeed`]: a state machine that
//! merges one bulk fetch with the subsequent stream of inserts into a
//! deduplicated, newest-first view with a derived unread count. The feed
//! is a read-through projection; the store stays authoritative.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, trace, warn};

use repairhub_core::AppResult;
use repairhub_core::config::RealtimeConfig;
use repairhub_core::types::{NotificationId, PageRequest, UserId};
use repairhub_database::NotificationStore;
use repairhub_entity::notification::Notification;
use repairhub_entity::user::UserRole;

use crate::bus::{FEED_CHANNEL, NotificationBus};
use crate::dedup::{IdentitySet, dedupe};

/// Lifecycle states of a session feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// No subscription active, view empty.
    Disconnected,
    /// Bulk fetch in flight.
    Syncing,
    /// Fetch merged and the subscription live; the view is authoritative
    /// for this session.
    Live,
    /// Subscription dropped; the next connect performs a full re-fetch.
    Reconnecting,
}

/// The in-memory notification view of one connected session.
pub struct SessionFeed {
    user_id: UserId,
    role: UserRole,
    store: Arc<dyn NotificationStore>,
    bus: Arc<NotificationBus>,
    sync_limit: u64,
    state: FeedState,
    entries: Vec<Notification>,
    seen: IdentitySet,
    unread: usize,
    rx: Option<broadcast::Receiver<Notification>>,
}

impl SessionFeed {
    /// Create a disconnected feed for a session.
    pub fn new(
        user_id: UserId,
        role: UserRole,
        store: Arc<dyn NotificationStore>,
        bus: Arc<NotificationBus>,
        config: &RealtimeConfig,
    ) -> Self {
        Self {
            user_id,
            role,
            store,
            bus,
            sync_limit: config.sync_limit,
            state: FeedState::Disconnected,
            entries: Vec::new(),
            seen: IdentitySet::new(),
            unread: 0,
            rx: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> FeedState {
        self.state
    }

    /// The merged, deduplicated view, newest first.
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Number of entries in the view.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of unread entries in the view.
    pub fn unread_count(&self) -> usize {
        self.unread
    }

    /// Bring the feed live: subscribe, bulk fetch, merge.
    ///
    /// The subscription is established before the fetch executes, so an
    /// insert landing in between is observed on both paths; the identity
    /// set collapses the double observation. An insert landing before the
    /// subscription cannot be replayed and is recovered by the next full
    /// re-sync.
    pub async fn connect(&mut self) -> AppResult<()> {
        self.rx = Some(self.bus.subscribe(FEED_CHANNEL).await);
        self.state = FeedState::Syncing;

        let page = PageRequest::new(1, self.sync_limit);
        match self
            .store
            .find_for_recipient(self.user_id, self.role, &page)
            .await
        {
            Ok(records) => {
                let records = dedupe(records);
                self.seen = IdentitySet::from_records(&records);
                self.unread = records.iter().filter(|r| r.is_unread()).count();
                self.entries = records;
                self.state = FeedState::Live;
                debug!(
                    user_id = %self.user_id,
                    entries = self.entries.len(),
                    unread = self.unread,
                    "Session feed synced"
                );
                Ok(())
            }
            Err(e) => {
                self.rx = None;
                self.state = FeedState::Disconnected;
                Err(e)
            }
        }
    }

    /// Re-enter the live state after a transport drop, with a full
    /// re-fetch. Streamed history is never replayed.
    pub async fn reconnect(&mut self) -> AppResult<()> {
        self.state = FeedState::Reconnecting;
        self.rx = None;
        self.entries.clear();
        self.seen.clear();
        self.unread = 0;
        self.connect().await
    }

    /// Note a transport-detected disconnect.
    pub fn on_disconnect(&mut self) {
        self.rx = None;
        self.state = FeedState::Reconnecting;
    }

    /// End the session: release the subscription and discard the view.
    pub fn close(&mut self) {
        self.rx = None;
        self.entries.clear();
        self.seen.clear();
        self.unread = 0;
        self.state = FeedState::Disconnected;
    }

    /// Offer a streamed insert to the view.
    ///
    /// Admission requires the feed to be live, the record to pass the
    /// session's access check, and its logical event to be unseen.
    /// Admitted records are prepended; duplicates increment nothing.
    pub fn admit(&mut self, record: Notification) -> bool {
        if self.state != FeedState::Live {
            return false;
        }
        if !record.visible_to(self.user_id, self.role) {
            return false;
        }
        if !self.seen.admit(&record) {
            trace!(id = %record.id, "Duplicate logical event dropped from feed");
            return false;
        }
        if record.is_unread() {
            self.unread += 1;
        }
        self.entries.insert(0, record);
        true
    }

    /// Process every insert already waiting on the subscription.
    ///
    /// Returns how many records were admitted. A lagged receiver means
    /// inserts were missed; the feed re-syncs in full rather than trust
    /// the stream.
    pub async fn drain(&mut self) -> AppResult<usize> {
        let mut admitted = 0;
        'subscription: loop {
            let Some(mut rx) = self.rx.take() else {
                break;
            };
            loop {
                match rx.try_recv() {
                    Ok(record) => {
                        if self.admit(record) {
                            admitted += 1;
                        }
                    }
                    Err(TryRecvError::Empty) => {
                        self.rx = Some(rx);
                        break 'subscription;
                    }
                    Err(TryRecvError::Lagged(skipped)) => {
                        warn!(skipped, "Feed subscription lagged; performing full re-sync");
                        drop(rx);
                        self.reconnect().await?;
                        continue 'subscription;
                    }
                    Err(TryRecvError::Closed) => {
                        self.state = FeedState::Reconnecting;
                        break 'subscription;
                    }
                }
            }
        }
        Ok(admitted)
    }

    /// Consume the subscription until it drops, admitting records as they
    /// arrive. Returns when the transport closes (state becomes
    /// [`FeedState::Reconnecting`]) or the feed is closed.
    pub async fn run(&mut self) -> AppResult<()> {
        loop {
            let Some(mut rx) = self.rx.take() else {
                return Ok(());
            };
            match rx.recv().await {
                Ok(record) => {
                    self.rx = Some(rx);
                    self.admit(record);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Feed subscription lagged; performing full re-sync");
                    self.reconnect().await?;
                }
                Err(RecvError::Closed) => {
                    self.state = FeedState::Reconnecting;
                    return Ok(());
                }
            }
        }
    }

    /// Mark one record read, optimistically.
    ///
    /// The view flips first; if the store call fails the change is rolled
    /// back so local state never silently diverges. Records outside the
    /// view window are forwarded to the store untouched.
    pub async fn mark_read(&mut self, id: NotificationId) -> AppResult<()> {
        let was_unread = match self.entries.iter_mut().find(|r| r.id == id) {
            Some(entry) if entry.read => return Ok(()),
            Some(entry) => {
                entry.read = true;
                true
            }
            None => false,
        };
        if was_unread {
            self.unread = self.unread.saturating_sub(1);
        }

        if let Err(e) = self.store.mark_read(id).await {
            if was_unread {
                if let Some(entry) = self.entries.iter_mut().find(|r| r.id == id) {
                    entry.read = false;
                }
                self.unread += 1;
            }
            return Err(e);
        }
        Ok(())
    }

    /// Mark every unread entry in the view read, optimistically.
    ///
    /// Applies the store's batch transition; on failure the whole
    /// optimistic change is rolled back, matching the store's
    /// all-or-nothing semantics.
    pub async fn mark_all_read(&mut self) -> AppResult<()> {
        let ids: Vec<NotificationId> = self
            .entries
            .iter()
            .filter(|r| r.is_unread())
            .map(|r| r.id)
            .collect();
        if ids.is_empty() {
            return Ok(());
        }

        for entry in self.entries.iter_mut() {
            if ids.contains(&entry.id) {
                entry.read = true;
            }
        }
        let prior_unread = self.unread;
        self.unread = 0;

        if let Err(e) = self.store.mark_many_read(&ids).await {
            for entry in self.entries.iter_mut() {
                if ids.contains(&entry.id) {
                    entry.read = false;
                }
            }
            self.unread = prior_unread;
            return Err(e);
        }
        Ok(())
    }
}

impl std::fmt::Debug for SessionFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFeed")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("state", &self.state)
            .field("entries", &self.entries.len())
            .field("unread", &self.unread)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use repairhub_core::error::{AppError, ErrorKind};
    use repairhub_core::types::TaskId;
    use repairhub_database::MemoryNotificationStore;
    use repairhub_entity::notification::{NewNotification, NotificationKind};

    /// Store wrapper whose write paths can be switched off, for
    /// exercising optimistic rollback.
    struct FlakyStore {
        inner: MemoryNotificationStore,
        fail_writes: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryNotificationStore::new(),
                fail_writes: AtomicBool::new(false),
            }
        }

        fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        fn offline(&self) -> AppError {
            AppError::database("notification store offline")
        }
    }

    #[async_trait]
    impl NotificationStore for FlakyStore {
        async fn create(&self, draft: NewNotification) -> AppResult<Notification> {
            self.inner.create(draft).await
        }

        async fn mark_read(&self, id: NotificationId) -> AppResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(self.offline());
            }
            self.inner.mark_read(id).await
        }

        async fn mark_many_read(&self, ids: &[NotificationId]) -> AppResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(self.offline());
            }
            self.inner.mark_many_read(ids).await
        }

        async fn find_for_recipient(
            &self,
            user_id: UserId,
            role: UserRole,
            page: &PageRequest,
        ) -> AppResult<Vec<Notification>> {
            self.inner.find_for_recipient(user_id, role, page).await
        }

        async fn count_unread(&self, user_id: UserId, role: UserRole) -> AppResult<i64> {
            self.inner.count_unread(user_id, role).await
        }

        async fn cleanup_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
            self.inner.cleanup_older_than(cutoff).await
        }
    }

    fn draft(
        recipient: Option<UserId>,
        role: Option<UserRole>,
        task_id: Option<TaskId>,
        message: &str,
    ) -> NewNotification {
        NewNotification {
            recipient_id: recipient,
            for_role: role,
            title: "title".to_string(),
            message: message.to_string(),
            kind: NotificationKind::StatusChange,
            task_id,
        }
    }

    fn make_feed(
        user: UserId,
        role: UserRole,
        store: Arc<dyn NotificationStore>,
        bus: Arc<NotificationBus>,
    ) -> SessionFeed {
        SessionFeed::new(user, role, store, bus, &RealtimeConfig::default())
    }

    #[tokio::test]
    async fn test_sync_dedupes_fetched_records() {
        let store = Arc::new(MemoryNotificationStore::new());
        let bus = Arc::new(NotificationBus::new(16));
        let admin = UserId::new();
        let task = TaskId::new();

        // The same logical event persisted twice (direct + broadcast).
        store
            .create(draft(Some(admin), None, Some(task), "marked completed"))
            .await
            .unwrap();
        store
            .create(draft(None, Some(UserRole::Admin), Some(task), "marked completed"))
            .await
            .unwrap();
        store
            .create(draft(Some(admin), None, None, "something else"))
            .await
            .unwrap();

        let mut feed = make_feed(admin, UserRole::Admin, store, bus);
        assert_eq!(feed.state(), FeedState::Disconnected);
        feed.connect().await.unwrap();

        assert_eq!(feed.state(), FeedState::Live);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.unread_count(), 2);
    }

    #[tokio::test]
    async fn test_streamed_inserts_merge_with_dedup() {
        let store = Arc::new(MemoryNotificationStore::new());
        let bus = Arc::new(NotificationBus::new(16));
        let admin = UserId::new();
        let task = TaskId::new();

        // N = 1 fetched record.
        let fetched = store
            .create(draft(None, Some(UserRole::Admin), Some(task), "marked completed"))
            .await
            .unwrap();

        let mut feed = make_feed(admin, UserRole::Admin, store.clone(), bus.clone());
        feed.connect().await.unwrap();
        assert_eq!(feed.len(), 1);

        // M = 3 streamed inserts, K = 1 duplicating the fetched identity.
        bus.publish(FEED_CHANNEL, fetched.clone()).await;
        let fresh_a = store
            .create(draft(None, Some(UserRole::Admin), Some(task), "assigned elsewhere"))
            .await
            .unwrap();
        let fresh_b = store
            .create(draft(Some(admin), None, None, "direct note"))
            .await
            .unwrap();
        bus.publish(FEED_CHANNEL, fresh_a).await;
        bus.publish(FEED_CHANNEL, fresh_b).await;

        let admitted = feed.drain().await.unwrap();
        assert_eq!(admitted, 2);
        assert_eq!(feed.len(), 1 + (3 - 1));
        assert_eq!(feed.unread_count(), 3);
    }

    #[tokio::test]
    async fn test_overlap_redelivery_keeps_single_entry() {
        let store = Arc::new(MemoryNotificationStore::new());
        let bus = Arc::new(NotificationBus::new(16));
        let admin = UserId::new();
        let task = TaskId::new();

        let record = store
            .create(draft(None, Some(UserRole::Admin), Some(task), "task 42 completed"))
            .await
            .unwrap();

        let mut feed = make_feed(admin, UserRole::Admin, store, bus.clone());
        feed.connect().await.unwrap();

        // Simulated fetch/stream overlap: the bulk-fetched record arrives
        // again on the subscription.
        bus.publish(FEED_CHANNEL, record).await;
        feed.drain().await.unwrap();

        assert_eq!(feed.len(), 1);
        assert_eq!(feed.unread_count(), 1);
    }

    #[tokio::test]
    async fn test_access_check_rejects_foreign_records() {
        let store = Arc::new(MemoryNotificationStore::new());
        let bus = Arc::new(NotificationBus::new(16));
        let technician = UserId::new();

        let mut feed = make_feed(technician, UserRole::Technician, store.clone(), bus.clone());
        feed.connect().await.unwrap();

        let foreign = store
            .create(draft(Some(UserId::new()), None, None, "someone else's"))
            .await
            .unwrap();
        let broadcast = store
            .create(draft(None, Some(UserRole::Admin), None, "admins only"))
            .await
            .unwrap();
        let own = store
            .create(draft(Some(technician), None, None, "yours"))
            .await
            .unwrap();
        bus.publish(FEED_CHANNEL, foreign).await;
        bus.publish(FEED_CHANNEL, broadcast).await;
        bus.publish(FEED_CHANNEL, own).await;

        let admitted = feed.drain().await.unwrap();
        assert_eq!(admitted, 1);
        assert_eq!(feed.entries()[0].message, "yours");
    }

    #[tokio::test]
    async fn test_streamed_records_are_prepended() {
        let store = Arc::new(MemoryNotificationStore::new());
        let bus = Arc::new(NotificationBus::new(16));
        let user = UserId::new();

        store
            .create(draft(Some(user), None, None, "older"))
            .await
            .unwrap();

        let mut feed = make_feed(user, UserRole::Officer, store.clone(), bus.clone());
        feed.connect().await.unwrap();

        let newer = store
            .create(draft(Some(user), None, None, "newer"))
            .await
            .unwrap();
        bus.publish(FEED_CHANNEL, newer).await;
        feed.drain().await.unwrap();

        assert_eq!(feed.entries()[0].message, "newer");
        assert_eq!(feed.entries()[1].message, "older");
    }

    #[tokio::test]
    async fn test_mark_read_rolls_back_on_store_failure() {
        let store = Arc::new(FlakyStore::new());
        let bus = Arc::new(NotificationBus::new(16));
        let user = UserId::new();

        let record = store
            .create(draft(Some(user), None, None, "unread"))
            .await
            .unwrap();

        let mut feed = make_feed(user, UserRole::Officer, store.clone(), bus);
        feed.connect().await.unwrap();
        assert_eq!(feed.unread_count(), 1);

        store.fail_writes(true);
        let err = feed.mark_read(record.id).await.unwrap_err();
        assert!(err.is_kind(ErrorKind::Database));
        assert_eq!(feed.unread_count(), 1, "optimistic change must roll back");
        assert!(feed.entries()[0].is_unread());

        store.fail_writes(false);
        feed.mark_read(record.id).await.unwrap();
        assert_eq!(feed.unread_count(), 0);
        assert!(feed.entries()[0].read);

        // Second call is an idempotent no-op.
        feed.mark_read(record.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_mark_all_read_rolls_back_as_a_set() {
        let store = Arc::new(FlakyStore::new());
        let bus = Arc::new(NotificationBus::new(16));
        let user = UserId::new();

        for i in 0..3 {
            store
                .create(draft(Some(user), None, None, &format!("event {i}")))
                .await
                .unwrap();
        }

        let mut feed = make_feed(user, UserRole::Officer, store.clone(), bus);
        feed.connect().await.unwrap();
        assert_eq!(feed.unread_count(), 3);

        store.fail_writes(true);
        assert!(feed.mark_all_read().await.is_err());
        assert_eq!(feed.unread_count(), 3);
        assert!(feed.entries().iter().all(Notification::is_unread));

        store.fail_writes(false);
        feed.mark_all_read().await.unwrap();
        assert_eq!(feed.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_reconnect_recovers_missed_inserts() {
        let store = Arc::new(MemoryNotificationStore::new());
        let bus = Arc::new(NotificationBus::new(16));
        let user = UserId::new();

        let mut feed = make_feed(user, UserRole::Officer, store.clone(), bus.clone());
        feed.connect().await.unwrap();
        assert!(feed.is_empty());

        // Transport drops; an insert lands while nobody is listening.
        feed.on_disconnect();
        assert_eq!(feed.state(), FeedState::Reconnecting);
        store
            .create(draft(Some(user), None, None, "missed while away"))
            .await
            .unwrap();

        feed.reconnect().await.unwrap();
        assert_eq!(feed.state(), FeedState::Live);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.entries()[0].message, "missed while away");
    }

    #[tokio::test]
    async fn test_close_discards_view_and_subscription() {
        let store = Arc::new(MemoryNotificationStore::new());
        let bus = Arc::new(NotificationBus::new(16));
        let user = UserId::new();

        store
            .create(draft(Some(user), None, None, "entry"))
            .await
            .unwrap();

        let mut feed = make_feed(user, UserRole::Officer, store.clone(), bus.clone());
        feed.connect().await.unwrap();
        assert_eq!(feed.len(), 1);

        feed.close();
        assert_eq!(feed.state(), FeedState::Disconnected);
        assert!(feed.is_empty());
        assert_eq!(feed.unread_count(), 0);

        // A record published after close never reaches the view.
        let late = store
            .create(draft(Some(user), None, None, "late"))
            .await
            .unwrap();
        bus.publish(FEED_CHANNEL, late).await;
        assert_eq!(feed.drain().await.unwrap(), 0);
        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn test_read_records_do_not_count_as_unread() {
        let store = Arc::new(MemoryNotificationStore::new());
        let bus = Arc::new(NotificationBus::new(16));
        let user = UserId::new();

        let record = store
            .create(draft(Some(user), None, None, "already read"))
            .await
            .unwrap();
        store.mark_read(record.id).await.unwrap();

        let mut feed = make_feed(user, UserRole::Officer, store, bus);
        feed.connect().await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.unread_count(), 0);
    }
}
