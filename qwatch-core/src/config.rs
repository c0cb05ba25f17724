//! Runtime configuration shared across the pipeline.
//!
//! The app crate owns loading and validation (TOML file, CLI overrides,
//! SIGHUP reload) and publishes the result over a `tokio::sync::watch`
//! channel; the scheduler reads the current value at the start of every
//! poll pass and treats a publish as a `FilterChanged` trigger.

use crate::entities::{FeedKey, UserLocation};
use std::time::Duration;

/// Default poll interval between scheduled passes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(120);

/// Validated runtime configuration for one watching session.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    /// Which summary feed document to poll.
    pub feed: FeedKey,
    /// Events below this magnitude are filtered out at fetch time.
    pub min_magnitude: f64,
    /// Interval between scheduled poll passes.
    pub poll_interval: Duration,
    /// The user's reference location, if one was selected.
    pub location: Option<UserLocation>,
    /// Radius for regional proximity alerts, in km. Always finite and
    /// positive; the config loader normalizes invalid values.
    pub radius_km: f64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            feed: FeedKey::AllHour,
            min_magnitude: 0.0,
            poll_interval: DEFAULT_POLL_INTERVAL,
            location: None,
            radius_km: crate::processors::classifier::DEFAULT_REGIONAL_RADIUS_KM,
        }
    }
}
