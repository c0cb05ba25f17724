pub mod location;
pub mod quake;

pub use location::UserLocation;
pub use quake::QuakeEvent;

use serde::{Deserialize, Serialize};

/// USGS summary feed variant.
///
/// Each variant corresponds to one of the fixed `.geojson` documents under
/// the USGS summary endpoint, differing by time window and severity band.
/// The variant also knows its time window, which bounds how long seen event
/// ids are worth remembering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedKey {
    #[serde(rename = "all_hour")]
    AllHour,
    #[serde(rename = "all_day")]
    AllDay,
    #[serde(rename = "all_week")]
    AllWeek,
    #[serde(rename = "m2_5_day")]
    M25Day,
    #[serde(rename = "m4_5_day")]
    M45Day,
    #[serde(rename = "m4_5_week")]
    M45Week,
    #[serde(rename = "significant_week")]
    SignificantWeek,
    #[serde(rename = "significant_month")]
    SignificantMonth,
}

impl FeedKey {
    /// Path segment of the feed document, appended to the summary base URL.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::AllHour => "all_hour",
            Self::AllDay => "all_day",
            Self::AllWeek => "all_week",
            Self::M25Day => "2.5_day",
            Self::M45Day => "4.5_day",
            Self::M45Week => "4.5_week",
            Self::SignificantWeek => "significant_week",
            Self::SignificantMonth => "significant_month",
        }
    }

    /// The time window the feed covers.
    pub fn window(&self) -> std::time::Duration {
        const HOUR: u64 = 60 * 60;
        let secs = match self {
            Self::AllHour => HOUR,
            Self::AllDay | Self::M25Day | Self::M45Day => 24 * HOUR,
            Self::AllWeek | Self::M45Week | Self::SignificantWeek => 7 * 24 * HOUR,
            Self::SignificantMonth => 30 * 24 * HOUR,
        };
        std::time::Duration::from_secs(secs)
    }
}

impl std::fmt::Display for FeedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl std::str::FromStr for FeedKey {
    type Err = String;

    /// Parses the config-file spelling (`all_hour`, `m4_5_day`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_hour" => Ok(Self::AllHour),
            "all_day" => Ok(Self::AllDay),
            "all_week" => Ok(Self::AllWeek),
            "m2_5_day" => Ok(Self::M25Day),
            "m4_5_day" => Ok(Self::M45Day),
            "m4_5_week" => Ok(Self::M45Week),
            "significant_week" => Ok(Self::SignificantWeek),
            "significant_month" => Ok(Self::SignificantMonth),
            other => Err(format!("unknown feed key: {other}")),
        }
    }
}

/// Alert severity classification, assigned independently per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertTier {
    /// Strong quake anywhere on the globe.
    Global,
    /// Quake within the configured radius of the user's location.
    Regional,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_key_path_segments() {
        assert_eq!(FeedKey::AllHour.path_segment(), "all_hour");
        assert_eq!(FeedKey::M45Day.path_segment(), "4.5_day");
        assert_eq!(FeedKey::SignificantWeek.path_segment(), "significant_week");
    }

    #[test]
    fn feed_key_windows_are_ordered() {
        assert!(FeedKey::AllHour.window() < FeedKey::AllDay.window());
        assert!(FeedKey::AllDay.window() < FeedKey::AllWeek.window());
        assert!(FeedKey::AllWeek.window() < FeedKey::SignificantMonth.window());
    }

    #[test]
    fn feed_key_config_names_round_trip() {
        let key: FeedKey = serde_json::from_str("\"m4_5_day\"").unwrap();
        assert_eq!(key, FeedKey::M45Day);
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"m4_5_day\"");
    }

    #[test]
    fn feed_key_parses_from_config_names() {
        assert_eq!("m2_5_day".parse::<FeedKey>(), Ok(FeedKey::M25Day));
        assert!("all_month".parse::<FeedKey>().is_err());
    }
}
