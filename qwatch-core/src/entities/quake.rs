use compact_str::CompactString;

/// One observed seismic event from the feed.
///
/// The `id` is the feed's stable identifier for the physical event; two
/// fetches returning the same id describe the same quake and must not alert
/// twice. A missing id comes through as an empty string and the reconciler
/// drops such entries entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct QuakeEvent {
    pub id: CompactString,
    pub latitude: f64,
    pub longitude: f64,
    /// Depth below surface. Unknown depth renders as 0 but is never used
    /// for classification.
    pub depth_km: Option<f64>,
    /// Missing magnitude in the feed is treated as 0.
    pub magnitude: f64,
    pub place: CompactString,
    /// Event time, epoch milliseconds. Display ordering only.
    pub time_ms: i64,
}

impl QuakeEvent {
    /// Magnitude rounded to one decimal, the way the feed UI presents it.
    pub fn magnitude_display(&self) -> f64 {
        (self.magnitude * 10.0).round() / 10.0
    }
}

/// Placeholder used when the feed carries no place description.
pub const UNKNOWN_PLACE: &str = "Unknown location";
