//! Event type definitions for the polling pipeline.
//!
//! All events are ephemeral; nothing here survives the session. The
//! scheduler is the only producer of `SnapshotUpdate` and `AlertNotice`,
//! and the only consumer of `PollTrigger`.

use crate::entities::QuakeEvent;
use compact_str::CompactString;

/// Why a poll pass was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTrigger {
    /// The fixed poll interval elapsed.
    Scheduled,
    /// The user asked for an immediate refresh.
    Manual,
    /// The feed selection or filter configuration changed.
    FilterChanged,
}

impl std::fmt::Display for PollTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollTrigger::Scheduled => write!(f, "scheduled"),
            PollTrigger::Manual => write!(f, "manual"),
            PollTrigger::FilterChanged => write!(f, "filter_changed"),
        }
    }
}

/// Full reconciled event list, sorted by event time descending.
///
/// Sent to the external renderer after every applied poll pass. The
/// ordering is a presentation contract; consumers rely on it.
#[derive(Debug, Clone)]
pub struct SnapshotUpdate {
    pub events: Vec<QuakeEvent>,
}

/// One notification act for the notification controller.
///
/// An event matching both alert tiers produces two notices, each going
/// through the same banner/audio/title-flash channels.
#[derive(Debug, Clone)]
pub enum AlertNotice {
    /// Strong quake anywhere: magnitude at or above the global threshold.
    Global { event: QuakeEvent },
    /// Quake within the configured radius of the user's location.
    Regional {
        event: QuakeEvent,
        /// Great-circle distance from the user's location, in km.
        distance_km: f64,
        /// Name of the user's selected location, for the banner text.
        location_name: CompactString,
    },
    /// A transient status message (fetch failure, location-picker
    /// feedback). Banner only, baseline duration, no audio or flash.
    Transient { message: String },
}
