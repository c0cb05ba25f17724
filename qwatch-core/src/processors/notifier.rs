//! Notification controller.
//!
//! Receives [`AlertNotice`] events and drives three presentation channels
//! through a [`NotificationSink`]: a banner with auto expiry, a single
//! audio cue, and a title-flash loop with bounded duration. Each timed
//! channel is an explicit cancellable tokio task owned by the controller,
//! so a newer trigger supersedes a pending one deterministically and tests
//! can drive the machinery with paused time.

use crate::events::{AlertNotice, AlertNoticeReceiver};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Baseline banner duration for transient messages.
pub const BANNER_BASE_DURATION: Duration = Duration::from_millis(8_000);
/// Banner duration for global alerts.
pub const BANNER_GLOBAL_DURATION: Duration = Duration::from_millis(12_000);
/// Banner duration for regional alerts.
pub const BANNER_REGIONAL_DURATION: Duration = Duration::from_millis(15_000);
/// Title alternation period while flashing.
pub const FLASH_PERIOD: Duration = Duration::from_millis(800);
/// Total duration of one flash cycle before the title is restored.
pub const FLASH_TOTAL_DURATION: Duration = Duration::from_millis(8_000);

/// Audio cue playback failure (e.g. no output device, playback blocked).
///
/// Always caught and logged by the controller; notification degrades to
/// visual-only.
#[derive(Debug, Error)]
#[error("audio cue failed: {0}")]
pub struct CueError(String);

impl CueError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Presentation backend for the notification channels.
///
/// The controller owns all timing; implementations only render. They must
/// be cheap and non-blocking.
pub trait NotificationSink: Send + Sync + 'static {
    /// Display `message` as the active banner, replacing any current one.
    fn show_banner(&self, message: &str);
    /// Remove the active banner.
    fn clear_banner(&self);
    /// Set the window/tab title to `title`.
    fn set_title(&self, title: &str);
    /// Restore the original title.
    fn restore_title(&self);
    /// Play the alert cue from the beginning. A trigger while a cue is
    /// still sounding restarts playback from zero rather than overlapping.
    fn play_cue(&self) -> Result<(), CueError>;
}

/// Per-channel timed state machines over a [`NotificationSink`].
pub struct NotificationController<S: NotificationSink> {
    sink: Arc<S>,
    banner_clear: Option<JoinHandle<()>>,
    flash_cycle: Option<JoinHandle<()>>,
}

impl<S: NotificationSink> NotificationController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(sink),
            banner_clear: None,
            flash_cycle: None,
        }
    }

    /// Run the controller until shutdown is signaled.
    pub async fn run(
        mut self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut notice_rx: AlertNoticeReceiver,
    ) {
        info!("NotificationController started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("NotificationController received shutdown signal");
                        break;
                    }
                }

                Some(notice) = notice_rx.recv() => {
                    debug!(notice = ?notice, "Received AlertNotice");
                    self.handle_notice(notice);
                }

                else => {
                    info!("AlertNotice channel closed");
                    break;
                }
            }
        }

        self.cancel_timers();
        self.sink.restore_title();
        info!("NotificationController shutdown complete");
    }

    /// Dispatch one notice to the channels.
    pub fn handle_notice(&mut self, notice: AlertNotice) {
        match notice {
            AlertNotice::Global { event } => {
                let magnitude = event.magnitude_display();
                let message = format!("Strong earthquake: M{magnitude} - {}", event.place);
                self.alert(&message, BANNER_GLOBAL_DURATION, format!("Quake M{magnitude}"));
            }
            AlertNotice::Regional {
                event,
                distance_km,
                location_name,
            } => {
                let magnitude = event.magnitude_display();
                let message = format!(
                    "Nearby quake for {location_name}: M{magnitude} at {} km",
                    distance_km.round() as i64
                );
                self.alert(
                    &message,
                    BANNER_REGIONAL_DURATION,
                    format!("Nearby quake M{magnitude}"),
                );
            }
            AlertNotice::Transient { message } => {
                self.show_banner(&message, BANNER_BASE_DURATION);
            }
        }
    }

    /// One full notification act: banner + audio + title flash.
    fn alert(&mut self, message: &str, banner_duration: Duration, flash_text: String) {
        self.show_banner(message, banner_duration);
        if let Err(e) = self.sink.play_cue() {
            warn!(error = %e, "Audio cue failed, continuing without sound");
        }
        self.flash_title(flash_text);
    }

    /// Show a banner and schedule its clearing.
    ///
    /// A show before the previous banner expired cancels the pending clear
    /// and reschedules against the new message: last writer wins, no
    /// queueing.
    pub fn show_banner(&mut self, message: &str, duration: Duration) {
        if let Some(pending) = self.banner_clear.take() {
            pending.abort();
        }

        self.sink.show_banner(message);

        let sink = Arc::clone(&self.sink);
        self.banner_clear = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            sink.clear_banner();
        }));
    }

    /// Start (or restart) the title-flash loop.
    ///
    /// The title alternates between `text` and the original every
    /// [`FLASH_PERIOD`], stops after [`FLASH_TOTAL_DURATION`] and restores
    /// the original title. Only one cycle is ever active; a new call
    /// supersedes the running one.
    pub fn flash_title(&mut self, text: String) {
        if let Some(active) = self.flash_cycle.take() {
            active.abort();
        }

        let sink = Arc::clone(&self.sink);
        self.flash_cycle = Some(tokio::spawn(async move {
            let deadline = tokio::time::Instant::now() + FLASH_TOTAL_DURATION;
            let mut showing_flash = false;

            loop {
                tokio::time::sleep(FLASH_PERIOD).await;
                if tokio::time::Instant::now() >= deadline {
                    break;
                }
                showing_flash = !showing_flash;
                if showing_flash {
                    sink.set_title(&text);
                } else {
                    sink.restore_title();
                }
            }

            sink.restore_title();
        }));
    }

    fn cancel_timers(&mut self) {
        if let Some(pending) = self.banner_clear.take() {
            pending.abort();
        }
        if let Some(active) = self.flash_cycle.take() {
            active.abort();
        }
    }
}
