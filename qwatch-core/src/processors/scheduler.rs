//! Poll scheduler.
//!
//! Owns the polling pipeline: runs the interval timer, issues feed fetches,
//! reconciles completed snapshots against the seen registry, classifies
//! newly observed events and emits `SnapshotUpdate` and `AlertNotice`
//! events. Fetches run in spawned tasks so a slow response never blocks the
//! control loop; every fetch carries a sequence number and only the most
//! recently issued one is applied, so a trigger burst settles on the
//! freshest snapshot instead of whichever response lands last.

use crate::config::WatchConfig;
use crate::entities::QuakeEvent;
use crate::events::{
    AlertNotice, AlertNoticeSender, PollTrigger, PollTriggerReceiver, SnapshotUpdate,
    SnapshotUpdateSender, DEFAULT_CHANNEL_BUFFER,
};
use crate::processors::classifier::classify;
use crate::processors::fetcher::{FeedSource, FetchError};
use crate::processors::reconciler::Reconciler;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Banner text shown when a poll pass fails.
pub const FETCH_FAILURE_MESSAGE: &str = "Error fetching earthquake data";

/// Completion of one spawned fetch task.
struct FetchOutcome {
    seq: u64,
    trigger: PollTrigger,
    result: Result<Vec<QuakeEvent>, FetchError>,
}

/// Pipeline controller for one watching session.
pub struct PollScheduler<S: FeedSource> {
    source: Arc<S>,
    reconciler: Reconciler,
    config_rx: watch::Receiver<WatchConfig>,
    trigger_rx: PollTriggerReceiver,
    snapshot_tx: SnapshotUpdateSender,
    notice_tx: AlertNoticeSender,
    latest_issued: u64,
}

impl<S: FeedSource + 'static> PollScheduler<S> {
    pub fn new(
        source: Arc<S>,
        config_rx: watch::Receiver<WatchConfig>,
        trigger_rx: PollTriggerReceiver,
        snapshot_tx: SnapshotUpdateSender,
        notice_tx: AlertNoticeSender,
    ) -> Self {
        Self {
            source,
            reconciler: Reconciler::new(),
            config_rx,
            trigger_rx,
            snapshot_tx,
            notice_tx,
            latest_issued: 0,
        }
    }

    /// Run the scheduler until shutdown is signaled.
    ///
    /// The first scheduled poll fires immediately on startup; subsequent
    /// ones follow the configured interval.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut config = self.config_rx.borrow().clone();
        info!(
            feed = %config.feed,
            poll_interval_secs = config.poll_interval.as_secs(),
            "PollScheduler started"
        );

        // Completions from spawned fetch tasks. The local sender keeps the
        // channel open for the lifetime of the loop.
        let (done_tx, mut done_rx) = mpsc::channel::<FetchOutcome>(DEFAULT_CHANNEL_BUFFER);

        let mut tick = tokio::time::interval(config.poll_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("PollScheduler received shutdown signal");
                        break;
                    }
                }

                changed = self.config_rx.changed() => {
                    if changed.is_err() {
                        info!("Configuration channel closed");
                        break;
                    }
                    let updated = self.config_rx.borrow().clone();
                    if updated.poll_interval != config.poll_interval {
                        // Re-arm without an immediate extra tick.
                        tick = tokio::time::interval_at(
                            tokio::time::Instant::now() + updated.poll_interval,
                            updated.poll_interval,
                        );
                        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    }
                    let filter_changed = updated.feed != config.feed
                        || updated.min_magnitude != config.min_magnitude;
                    info!(feed = %updated.feed, "Applied configuration update");
                    config = updated;
                    if filter_changed {
                        self.issue_fetch(&config, &done_tx, PollTrigger::FilterChanged);
                    }
                }

                maybe_trigger = self.trigger_rx.recv() => {
                    match maybe_trigger {
                        Some(trigger) => self.issue_fetch(&config, &done_tx, trigger),
                        None => {
                            info!("PollTrigger channel closed");
                            break;
                        }
                    }
                }

                _ = tick.tick() => {
                    self.issue_fetch(&config, &done_tx, PollTrigger::Scheduled);
                }

                Some(outcome) = done_rx.recv() => {
                    self.handle_completion(outcome, &config).await;
                }
            }
        }

        info!("PollScheduler shutdown complete");
    }

    /// Spawn one fetch task tagged with a fresh sequence number.
    fn issue_fetch(
        &mut self,
        config: &WatchConfig,
        done_tx: &mpsc::Sender<FetchOutcome>,
        trigger: PollTrigger,
    ) {
        self.latest_issued += 1;
        let seq = self.latest_issued;
        debug!(seq, %trigger, feed = %config.feed, "Issuing feed fetch");

        let source = Arc::clone(&self.source);
        let feed = config.feed;
        let min_magnitude = config.min_magnitude;
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_snapshot(feed, min_magnitude).await;
            let _ = done_tx.send(FetchOutcome { seq, trigger, result }).await;
        });
    }

    /// Apply one fetch completion, or discard it if a newer fetch has been
    /// issued since.
    async fn handle_completion(&mut self, outcome: FetchOutcome, config: &WatchConfig) {
        if outcome.seq != self.latest_issued {
            debug!(
                seq = outcome.seq,
                latest = self.latest_issued,
                "Discarding stale fetch completion"
            );
            return;
        }

        match outcome.result {
            Ok(snapshot) => self.apply_snapshot(snapshot, config).await,
            Err(e) => {
                warn!(error = %e, feed = %config.feed, trigger = %outcome.trigger, "Feed fetch failed");
                let notice = AlertNotice::Transient {
                    message: FETCH_FAILURE_MESSAGE.to_string(),
                };
                if let Err(e) = self.notice_tx.send(notice).await {
                    error!(error = %e, "Failed to send AlertNotice");
                }
            }
        }
    }

    /// Reconcile a fetched snapshot, alert on newly observed events, and
    /// publish the ordered list.
    async fn apply_snapshot(&mut self, snapshot: Vec<QuakeEvent>, config: &WatchConfig) {
        let now_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        let outcome = self.reconciler.reconcile(snapshot, config.feed, now_ms);
        info!(
            total = outcome.ordered.len(),
            new = outcome.newly_observed.len(),
            feed = %config.feed,
            "Applied feed snapshot"
        );

        for event in &outcome.newly_observed {
            let classification = classify(event, config.location.as_ref(), config.radius_km);

            if classification.global {
                let notice = AlertNotice::Global {
                    event: event.clone(),
                };
                if let Err(e) = self.notice_tx.send(notice).await {
                    error!(error = %e, "Failed to send AlertNotice");
                }
            }

            if let (Some(distance_km), Some(location)) =
                (classification.regional, config.location.as_ref())
            {
                let notice = AlertNotice::Regional {
                    event: event.clone(),
                    distance_km,
                    location_name: location.name.clone(),
                };
                if let Err(e) = self.notice_tx.send(notice).await {
                    error!(error = %e, "Failed to send AlertNotice");
                }
            }
        }

        let update = SnapshotUpdate {
            events: outcome.ordered,
        };
        if let Err(e) = self.snapshot_tx.send(update).await {
            error!(error = %e, "Failed to send SnapshotUpdate");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{FeedKey, UserLocation};
    use crate::events::{alert_notice_channel, poll_trigger_channel, snapshot_update_channel};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    enum Scripted {
        Ready(Vec<QuakeEvent>),
        Delayed(Duration, Vec<QuakeEvent>),
        Fail,
    }

    /// Feed source that plays back a script, one entry per fetch, and
    /// records the parameters of every call. An exhausted script pends
    /// forever.
    struct ScriptedSource {
        script: Mutex<VecDeque<Scripted>>,
        calls: Mutex<Vec<(FeedKey, f64)>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Scripted>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(FeedKey, f64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FeedSource for ScriptedSource {
        async fn fetch_snapshot(
            &self,
            feed: FeedKey,
            min_magnitude: f64,
        ) -> Result<Vec<QuakeEvent>, FetchError> {
            self.calls.lock().unwrap().push((feed, min_magnitude));
            let entry = self.script.lock().unwrap().pop_front();
            match entry {
                Some(Scripted::Ready(events)) => Ok(events),
                Some(Scripted::Delayed(delay, events)) => {
                    tokio::time::sleep(delay).await;
                    Ok(events)
                }
                Some(Scripted::Fail) => Err(FetchError::Status { status: 503 }),
                None => std::future::pending().await,
            }
        }
    }

    struct Harness {
        config_tx: watch::Sender<WatchConfig>,
        trigger_tx: crate::events::PollTriggerSender,
        snapshot_rx: crate::events::SnapshotUpdateReceiver,
        notice_rx: crate::events::AlertNoticeReceiver,
        shutdown_tx: watch::Sender<bool>,
        handle: tokio::task::JoinHandle<()>,
    }

    fn spawn_scheduler(source: Arc<ScriptedSource>, config: WatchConfig) -> Harness {
        let (config_tx, config_rx) = watch::channel(config);
        let (trigger_tx, trigger_rx) = poll_trigger_channel();
        let (snapshot_tx, snapshot_rx) = snapshot_update_channel();
        let (notice_tx, notice_rx) = alert_notice_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let scheduler = PollScheduler::new(source, config_rx, trigger_rx, snapshot_tx, notice_tx);
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        Harness {
            config_tx,
            trigger_tx,
            snapshot_rx,
            notice_rx,
            shutdown_tx,
            handle,
        }
    }

    fn now_ms() -> i64 {
        OffsetDateTime::now_utc().unix_timestamp() * 1000
    }

    fn quake(id: &str, latitude: f64, longitude: f64, magnitude: f64, time_ms: i64) -> QuakeEvent {
        QuakeEvent {
            id: id.into(),
            latitude,
            longitude,
            depth_km: Some(10.0),
            magnitude,
            place: "Test Region".into(),
            time_ms,
        }
    }

    /// Let the scheduler and its fetch tasks run to quiescence.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn startup_poll_alerts_once_per_event() {
        let base = now_ms();
        let strong = quake("strong", 40.0, 40.0, 6.1, base - 1_000);
        let nearby = quake("nearby", 1.0, 1.3, 2.5, base - 2_000);
        let source = ScriptedSource::new(vec![
            Scripted::Ready(vec![nearby.clone(), strong.clone()]),
            Scripted::Ready(vec![nearby.clone(), strong.clone()]),
        ]);
        let config = WatchConfig {
            location: Some(UserLocation::new("Accra", 1.0, 1.0)),
            ..WatchConfig::default()
        };
        let mut harness = spawn_scheduler(source, config);

        // Startup pass: both events are new. Alerts arrive in descending
        // time order, then the ordered snapshot.
        match harness.notice_rx.recv().await {
            Some(AlertNotice::Global { event }) => assert_eq!(event.id, "strong"),
            other => panic!("expected global notice, got {other:?}"),
        }
        match harness.notice_rx.recv().await {
            Some(AlertNotice::Regional {
                event, distance_km, ..
            }) => {
                assert_eq!(event.id, "nearby");
                assert!(distance_km < 300.0);
            }
            other => panic!("expected regional notice, got {other:?}"),
        }
        let first = harness.snapshot_rx.recv().await.unwrap();
        assert_eq!(first.events[0].id, "strong");
        assert_eq!(first.events[1].id, "nearby");

        // Second pass returns the same document: full snapshot again, no
        // further alerts.
        harness.trigger_tx.send(PollTrigger::Manual).await.unwrap();
        let second = harness.snapshot_rx.recv().await.unwrap();
        assert_eq!(second.events.len(), 2);
        settle().await;
        assert!(harness.notice_rx.try_recv().is_err());

        harness.shutdown_tx.send(true).unwrap();
        harness.handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_becomes_a_transient_notice() {
        let source = ScriptedSource::new(vec![Scripted::Fail]);
        let mut harness = spawn_scheduler(source, WatchConfig::default());

        match harness.notice_rx.recv().await {
            Some(AlertNotice::Transient { message }) => {
                assert_eq!(message, FETCH_FAILURE_MESSAGE);
            }
            other => panic!("expected transient notice, got {other:?}"),
        }
        settle().await;
        assert!(harness.snapshot_rx.try_recv().is_err());

        harness.shutdown_tx.send(true).unwrap();
        harness.handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stale_fetch_completion_is_discarded() {
        let base = now_ms();
        let slow = quake("slow", 40.0, 40.0, 7.0, base - 5_000);
        let fast = quake("fast", 40.0, 40.0, 6.0, base - 1_000);
        let source = ScriptedSource::new(vec![
            Scripted::Delayed(Duration::from_secs(10), vec![slow.clone()]),
            Scripted::Ready(vec![fast.clone()]),
        ]);
        let mut harness = spawn_scheduler(source, WatchConfig::default());

        // The startup fetch stalls; a manual refresh supersedes it.
        harness.trigger_tx.send(PollTrigger::Manual).await.unwrap();

        let update = harness.snapshot_rx.recv().await.unwrap();
        assert_eq!(update.events.len(), 1);
        assert_eq!(update.events[0].id, "fast");
        match harness.notice_rx.recv().await {
            Some(AlertNotice::Global { event }) => assert_eq!(event.id, "fast"),
            other => panic!("expected global notice, got {other:?}"),
        }

        // The stalled fetch completes later and is dropped without
        // producing an update or an alert.
        tokio::time::advance(Duration::from_secs(11)).await;
        settle().await;
        assert!(harness.snapshot_rx.try_recv().is_err());
        assert!(harness.notice_rx.try_recv().is_err());

        harness.shutdown_tx.send(true).unwrap();
        harness.handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn interval_drives_subsequent_polls() {
        let base = now_ms();
        let first = quake("first", 0.0, 0.0, 1.0, base - 10_000);
        let second = quake("second", 0.0, 0.0, 1.2, base - 1_000);
        let source = ScriptedSource::new(vec![
            Scripted::Ready(vec![first.clone()]),
            Scripted::Ready(vec![first.clone(), second.clone()]),
        ]);
        let mut harness = spawn_scheduler(source, WatchConfig::default());

        let update = harness.snapshot_rx.recv().await.unwrap();
        assert_eq!(update.events.len(), 1);

        // No triggers sent; the next pass comes from the interval alone.
        let update = harness.snapshot_rx.recv().await.unwrap();
        assert_eq!(update.events.len(), 2);
        assert_eq!(update.events[0].id, "second");

        harness.shutdown_tx.send(true).unwrap();
        harness.handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn configuration_change_refetches_with_the_new_filter() {
        let source = ScriptedSource::new(vec![
            Scripted::Ready(vec![]),
            Scripted::Ready(vec![]),
        ]);
        let mut harness = spawn_scheduler(source.clone(), WatchConfig::default());

        harness.snapshot_rx.recv().await.unwrap();

        let updated = WatchConfig {
            feed: FeedKey::M45Day,
            min_magnitude: 4.5,
            ..WatchConfig::default()
        };
        harness.config_tx.send(updated).unwrap();
        harness.snapshot_rx.recv().await.unwrap();

        let calls = source.calls();
        assert_eq!(calls[0], (FeedKey::AllHour, 0.0));
        assert_eq!(calls[1], (FeedKey::M45Day, 4.5));

        harness.shutdown_tx.send(true).unwrap();
        harness.handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_the_scheduler() {
        let source = ScriptedSource::new(vec![Scripted::Ready(vec![])]);
        let harness = spawn_scheduler(source, WatchConfig::default());

        harness.shutdown_tx.send(true).unwrap();
        harness.handle.await.unwrap();
    }
}
