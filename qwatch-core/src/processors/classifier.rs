//! Alert classifier.
//!
//! Decides which alert tiers apply to a newly observed event. Pure: the
//! same event, location and radius always produce the same classification.
//! The two tiers are evaluated independently and an event may carry both.

use crate::entities::{AlertTier, QuakeEvent, UserLocation};
use crate::utils::geo;

/// Magnitude at or above which an event is a global alert.
pub const GLOBAL_MAGNITUDE_THRESHOLD: f64 = 5.0;

/// Regional radius used when the configured value is missing or invalid.
pub const DEFAULT_REGIONAL_RADIUS_KM: f64 = 300.0;

/// Tier decision for one event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Classification {
    /// Magnitude reached the global threshold.
    pub global: bool,
    /// Event lies within the regional radius of the user's location;
    /// carries the computed distance in km for the notification text.
    pub regional: Option<f64>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        !self.global && self.regional.is_none()
    }

    pub fn contains(&self, tier: AlertTier) -> bool {
        match tier {
            AlertTier::Global => self.global,
            AlertTier::Regional => self.regional.is_some(),
        }
    }
}

/// Classify one event against the alert policy.
///
/// `Global` applies at `magnitude >= 5.0`. `Regional` applies only when a
/// location is set and the great-circle distance to the event is within
/// `radius_km`.
pub fn classify(
    event: &QuakeEvent,
    location: Option<&UserLocation>,
    radius_km: f64,
) -> Classification {
    let global = event.magnitude >= GLOBAL_MAGNITUDE_THRESHOLD;

    let regional = location.and_then(|loc| {
        let distance = geo::distance_km(loc.latitude, loc.longitude, event.latitude, event.longitude);
        (distance <= radius_km).then_some(distance)
    });

    Classification { global, regional }
}
