//! Feed fetcher.
//!
//! Retrieves one snapshot of the selected USGS summary feed, parses the
//! GeoJSON FeatureCollection into [`QuakeEvent`]s and applies the
//! minimum-magnitude filter. It does not dedupe (the reconciler's job),
//! does not retry (the scheduler triggers the next attempt) and caches
//! nothing between calls.

use crate::entities::quake::UNKNOWN_PLACE;
use crate::entities::{FeedKey, QuakeEvent};
use async_trait::async_trait;
use compact_str::CompactString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while fetching a feed snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure
    #[error("feed request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The feed answered with a non-success status
    #[error("feed returned status {status}")]
    Status { status: u16 },

    /// The response body was not a valid feed document
    #[error("feed parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of feed snapshots.
///
/// The scheduler only sees this trait; tests substitute a scripted source
/// instead of the live USGS endpoint.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the current snapshot of `feed`, dropping events whose
    /// magnitude is below `min_magnitude`.
    async fn fetch_snapshot(
        &self,
        feed: FeedKey,
        min_magnitude: f64,
    ) -> Result<Vec<QuakeEvent>, FetchError>;
}

/// Live USGS summary feed over HTTP.
pub struct UsgsFeedSource {
    base_url: String,
    http_client: reqwest::Client,
}

impl UsgsFeedSource {
    const USGS_SUMMARY_BASE: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/";

    pub fn new() -> Self {
        Self::with_base_url(Self::USGS_SUMMARY_BASE)
    }

    /// Point the source at a different base URL (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn feed_url(&self, feed: FeedKey) -> String {
        format!("{}{}.geojson", self.base_url, feed.path_segment())
    }
}

impl Default for UsgsFeedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for UsgsFeedSource {
    async fn fetch_snapshot(
        &self,
        feed: FeedKey,
        min_magnitude: f64,
    ) -> Result<Vec<QuakeEvent>, FetchError> {
        let url = self.feed_url(feed);
        debug!(%feed, min_magnitude, "Fetching feed snapshot");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let document: FeatureCollection = serde_json::from_str(&body)?;
        let events = snapshot_from_document(document, min_magnitude);

        debug!(%feed, events = events.len(), "Fetched feed snapshot");
        Ok(events)
    }
}

/// Convert a parsed feed document into filtered events.
///
/// Separated from the HTTP path so parsing is testable without a network.
pub fn snapshot_from_document(document: FeatureCollection, min_magnitude: f64) -> Vec<QuakeEvent> {
    document
        .features
        .into_iter()
        .filter_map(QuakeEvent::try_from_feature)
        .filter(|event| event.magnitude >= min_magnitude)
        .collect()
}

impl QuakeEvent {
    /// Map one GeoJSON feature to an event.
    ///
    /// Features without a usable geometry are dropped here; a missing id
    /// becomes an empty string and is dropped later by the reconciler.
    fn try_from_feature(feature: Feature) -> Option<Self> {
        let coordinates = feature.geometry?.coordinates;
        let (longitude, latitude) = match coordinates.as_slice() {
            [lon, lat, ..] => (*lon, *lat),
            _ => return None,
        };

        Some(Self {
            id: feature.id.unwrap_or_default(),
            latitude,
            longitude,
            depth_km: coordinates.get(2).copied(),
            magnitude: feature.properties.mag.unwrap_or(0.0),
            place: feature
                .properties
                .place
                .unwrap_or_else(|| UNKNOWN_PLACE.into()),
            time_ms: feature.properties.time.unwrap_or(0),
        })
    }
}

// GeoJSON response types for the USGS summary feed.

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub id: Option<CompactString>,
    pub properties: FeatureProperties,
    #[serde(default)]
    pub geometry: Option<FeatureGeometry>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default)]
    pub place: Option<CompactString>,
    #[serde(default)]
    pub time: Option<i64>,
}

/// `coordinates` is `[lon, lat, depth]`; depth may be absent.
#[derive(Debug, Deserialize)]
pub struct FeatureGeometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str, min_magnitude: f64) -> Vec<QuakeEvent> {
        let document: FeatureCollection = serde_json::from_str(body).unwrap();
        snapshot_from_document(document, min_magnitude)
    }

    #[test]
    fn parses_a_feature_collection() {
        let body = r#"{
            "features": [
                {
                    "id": "us7000abcd",
                    "properties": {"mag": 6.2, "place": "10 km SS of Somewhere", "time": 1700000000000},
                    "geometry": {"coordinates": [15.98, 45.81, 10.5]}
                }
            ]
        }"#;

        let events = parse(body, 0.0);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.id, "us7000abcd");
        assert_eq!(event.latitude, 45.81);
        assert_eq!(event.longitude, 15.98);
        assert_eq!(event.depth_km, Some(10.5));
        assert_eq!(event.magnitude, 6.2);
        assert_eq!(event.time_ms, 1_700_000_000_000);
    }

    #[test]
    fn applies_the_minimum_magnitude_filter() {
        let body = r#"{
            "features": [
                {"id": "a", "properties": {"mag": 6.2}, "geometry": {"coordinates": [0.0, 0.0]}},
                {"id": "b", "properties": {"mag": 2.1}, "geometry": {"coordinates": [0.0, 0.0]}}
            ]
        }"#;

        let events = parse(body, 3.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "a");
    }

    #[test]
    fn missing_magnitude_counts_as_zero() {
        let body = r#"{
            "features": [
                {"id": "a", "properties": {}, "geometry": {"coordinates": [0.0, 0.0]}}
            ]
        }"#;

        assert_eq!(parse(body, 0.0)[0].magnitude, 0.0);
        assert!(parse(body, 0.1).is_empty());
    }

    #[test]
    fn missing_place_gets_the_placeholder() {
        let body = r#"{
            "features": [
                {"id": "a", "properties": {"mag": 1.0}, "geometry": {"coordinates": [0.0, 0.0]}}
            ]
        }"#;

        assert_eq!(parse(body, 0.0)[0].place, UNKNOWN_PLACE);
    }

    #[test]
    fn drops_features_without_geometry() {
        let body = r#"{
            "features": [
                {"id": "a", "properties": {"mag": 5.0}},
                {"id": "b", "properties": {"mag": 5.0}, "geometry": {"coordinates": [1.0]}}
            ]
        }"#;

        assert!(parse(body, 0.0).is_empty());
    }

    #[test]
    fn keeps_features_without_id_for_the_reconciler_to_drop() {
        let body = r#"{
            "features": [
                {"properties": {"mag": 5.0}, "geometry": {"coordinates": [0.0, 0.0]}}
            ]
        }"#;

        let events = parse(body, 0.0);
        assert_eq!(events.len(), 1);
        assert!(events[0].id.is_empty());
    }

    #[test]
    fn empty_document_yields_no_events() {
        assert!(parse(r#"{"features": []}"#, 0.0).is_empty());
        assert!(parse(r#"{}"#, 0.0).is_empty());
    }

    #[test]
    fn feed_urls_follow_the_summary_layout() {
        let source = UsgsFeedSource::new();
        assert_eq!(
            source.feed_url(FeedKey::AllHour),
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_hour.geojson"
        );
        assert_eq!(
            source.feed_url(FeedKey::M45Day),
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/4.5_day.geojson"
        );
    }
}
