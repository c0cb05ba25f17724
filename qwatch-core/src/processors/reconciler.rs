//! Event reconciler.
//!
//! Compares a freshly fetched snapshot against the identifiers seen in
//! earlier polling cycles, partitioning it into the full ordered list (for
//! the renderer) and the newly observed subset (for classification). The
//! registry lives for one session only; nothing is persisted.

use crate::entities::{FeedKey, QuakeEvent};
use compact_str::CompactString;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Slack added to the feed window before an id is evicted, covering feed
/// entries whose reported time sits right at the window edge.
const EVICTION_SLACK: Duration = Duration::from_secs(60 * 60);

/// Session-lifetime registry of event ids that were already classified.
///
/// Bounded: ids whose event time has fallen out of the feed's own time
/// window (plus slack) are evicted on every reconcile pass. The feed stops
/// serving those events at the same horizon, so eviction cannot let an
/// already-alerted quake alert again.
#[derive(Debug, Default)]
pub struct SeenRegistry {
    seen: HashMap<CompactString, i64>,
}

impl SeenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn insert(&mut self, id: CompactString, time_ms: i64) {
        self.seen.insert(id, time_ms);
    }

    /// Drop ids whose event time is older than `horizon_ms`.
    fn evict_older_than(&mut self, horizon_ms: i64) {
        let before = self.seen.len();
        self.seen.retain(|_, time_ms| *time_ms >= horizon_ms);
        let evicted = before - self.seen.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.seen.len(), "Evicted stale seen ids");
        }
    }
}

/// Result of one reconcile pass.
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// The full snapshot, sorted by event time descending. Presentation
    /// contract: the renderer and list consume this order as-is.
    pub ordered: Vec<QuakeEvent>,
    /// Events whose id was not in the registry before this pass.
    pub newly_observed: Vec<QuakeEvent>,
}

/// Owns the seen registry and partitions snapshots against it.
#[derive(Debug, Default)]
pub struct Reconciler {
    registry: SeenRegistry,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &SeenRegistry {
        &self.registry
    }

    /// Reconcile one snapshot.
    ///
    /// Events with an empty id are skipped entirely: neither returned in
    /// `ordered` nor registered. Registry insertion happens immediately per
    /// event, so an interrupted pass can lose notifications for the
    /// unprocessed remainder but can never double-register an id.
    ///
    /// For any id, `newly_observed` contains it on at most one call while
    /// the id stays inside the feed window.
    pub fn reconcile(
        &mut self,
        mut snapshot: Vec<QuakeEvent>,
        feed: FeedKey,
        now_ms: i64,
    ) -> ReconcileOutcome {
        let window_ms = (feed.window() + EVICTION_SLACK).as_millis() as i64;
        self.registry.evict_older_than(now_ms - window_ms);

        snapshot.retain(|event| !event.id.is_empty());
        snapshot.sort_by(|a, b| b.time_ms.cmp(&a.time_ms));

        let mut newly_observed = Vec::new();
        for event in &snapshot {
            if !self.registry.contains(&event.id) {
                self.registry.insert(event.id.clone(), event.time_ms);
                newly_observed.push(event.clone());
            }
        }

        ReconcileOutcome {
            ordered: snapshot,
            newly_observed,
        }
    }
}
