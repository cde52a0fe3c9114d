//! Logical-event deduplication.
//!
//! One business action can surface as more than one record in a session's
//! visible set: a broadcast and a direct write, or a bulk fetch racing the
//! realtime stream. Collapsing happens on [`EventIdentity`], keeping the
//! first occurrence in input order (newest first after the store's
//! ordering).

use std::collections::HashSet;

use repairhub_entity::notification::{EventIdentity, Notification};

/// Drop records whose logical event was already seen earlier in the input.
///
/// Pure, total, and order-preserving.
pub fn dedupe(records: Vec<Notification>) -> Vec<Notification> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.identity()))
        .collect()
}

/// Incremental first-occurrence-wins filter.
///
/// Used by the reconciler to admit streamed inserts one at a time with
/// the same semantics as [`dedupe`].
#[derive(Debug, Default)]
pub struct IdentitySet {
    seen: HashSet<EventIdentity>,
}

impl IdentitySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the set from already-admitted records.
    pub fn from_records(records: &[Notification]) -> Self {
        Self {
            seen: records.iter().map(Notification::identity).collect(),
        }
    }

    /// Record an identity; false when it was already present.
    pub fn admit(&mut self, record: &Notification) -> bool {
        self.seen.insert(record.identity())
    }

    /// Forget everything (used on full re-sync).
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
