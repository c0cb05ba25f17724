//! Terminal renderer for the reconciled event list.
//!
//! Consumes `SnapshotUpdate` events and prints the full ordered list after
//! every applied poll pass. Ordering comes from the reconciler; this module
//! only formats.

use qwatch_core::entities::QuakeEvent;
use qwatch_core::events::SnapshotUpdateReceiver;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::info;

const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");

/// Prints each snapshot as an ordered listing.
pub struct EventListRenderer {
    snapshot_rx: SnapshotUpdateReceiver,
}

impl EventListRenderer {
    pub fn new(snapshot_rx: SnapshotUpdateReceiver) -> Self {
        Self { snapshot_rx }
    }

    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!("EventListRenderer started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("EventListRenderer received shutdown signal");
                        break;
                    }
                }

                maybe_update = self.snapshot_rx.recv() => {
                    match maybe_update {
                        Some(update) => {
                            println!("--- {} events ---", update.events.len());
                            for event in &update.events {
                                println!("{}", render_line(event));
                            }
                        }
                        None => {
                            info!("SnapshotUpdate channel closed");
                            break;
                        }
                    }
                }
            }
        }

        info!("EventListRenderer shutdown complete");
    }
}

/// One listing line: magnitude, depth (unknown renders as 0), place, time.
pub fn render_line(event: &QuakeEvent) -> String {
    format!(
        "M{:<4} {:>5.1} km  {}  {}",
        event.magnitude_display(),
        event.depth_km.unwrap_or(0.0),
        format_time(event.time_ms),
        event.place,
    )
}

fn format_time(time_ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(time_ms) * 1_000_000)
        .ok()
        .and_then(|t| t.format(TIME_FORMAT).ok())
        .unwrap_or_else(|| format!("{time_ms} ms"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_carries_magnitude_place_and_zero_depth_fallback() {
        let event = QuakeEvent {
            id: "x".into(),
            latitude: 0.0,
            longitude: 0.0,
            depth_km: None,
            magnitude: 6.234,
            place: "10km NE of Somewhere".into(),
            time_ms: 1_700_000_000_000,
        };
        let line = render_line(&event);
        assert!(line.starts_with("M6.2"));
        assert!(line.contains("  0.0 km"));
        assert!(line.contains("2023-11-14"));
        assert!(line.ends_with("10km NE of Somewhere"));
    }

    #[test]
    fn unrepresentable_time_falls_back_to_raw_millis() {
        assert_eq!(format_time(i64::MAX), format!("{} ms", i64::MAX));
    }
}
