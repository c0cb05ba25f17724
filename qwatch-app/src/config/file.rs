//! TOML file configuration structures.
//!
//! These structs directly map to the `qwatch-config.toml` file format.
//! Every section is optional; an absent file or section falls back to the
//! defaults (all_hour feed, 120 s interval, 300 km radius, no location).

use qwatch_core::entities::FeedKey;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub alerts: AlertsSection,
    /// The user's reference location for regional alerts.
    pub location: Option<LocationSection>,
    /// Path to a JSON city list used by the `--city` selector.
    pub cities_file: Option<PathBuf>,
    /// Path to an audio file played as the alert cue. Without one a
    /// synthesized tone is used.
    pub audio_cue: Option<PathBuf>,
}

/// Feed selection section.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSection {
    /// Which summary feed document to poll (e.g. "all_hour", "m4_5_day").
    #[serde(default = "default_feed_key")]
    pub key: FeedKey,
    /// Events below this magnitude are dropped at fetch time.
    #[serde(default)]
    pub min_magnitude: f64,
    /// Seconds between scheduled poll passes.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_feed_key() -> FeedKey {
    FeedKey::AllHour
}

fn default_poll_interval_secs() -> u64 {
    120
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            key: default_feed_key(),
            min_magnitude: 0.0,
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Alert policy section.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertsSection {
    /// Radius for regional proximity alerts, in km.
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

fn default_radius_km() -> f64 {
    qwatch_core::processors::DEFAULT_REGIONAL_RADIUS_KM
}

impl Default for AlertsSection {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
        }
    }
}

/// Explicit location section. A `--city` selection takes precedence.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationSection {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}
