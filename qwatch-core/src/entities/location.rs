use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// The user's reference location for regional proximity alerts.
///
/// Owned by the surrounding configuration layer; the classifier only reads
/// it. Unset until the user selects a location, overwritten on
/// re-selection, never persisted across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub name: CompactString,
    pub latitude: f64,
    pub longitude: f64,
}

impl UserLocation {
    pub fn new(name: impl Into<CompactString>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}
