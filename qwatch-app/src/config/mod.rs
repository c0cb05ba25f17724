//! Configuration module for qwatch-app.
//!
//! Handles loading configuration from the TOML file and CLI arguments, and
//! rebuilding it on SIGHUP. The result is a validated
//! [`WatchConfig`] published to the pipeline over a watch channel.

pub mod file;

use crate::cities;
use crate::config::file::FileConfig;
use qwatch_core::config::WatchConfig;
use qwatch_core::entities::{FeedKey, UserLocation};
use qwatch_core::processors::DEFAULT_REGIONAL_RADIUS_KM;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// CLI overrides applied on top of the file configuration, on every load
/// and reload.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub feed: Option<FeedKey>,
    pub min_magnitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub city: Option<String>,
}

/// Loaded configuration result.
pub struct LoadedConfig {
    pub watch: WatchConfig,
    /// Audio file for the alert cue; `None` means the synthesized tone.
    pub audio_cue: Option<PathBuf>,
    /// Non-fatal problems (city lookup), surfaced as transient banners.
    pub warnings: Vec<String>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    overrides: CliOverrides,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, overrides: CliOverrides) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            overrides,
        }
    }

    /// Load and process the configuration.
    ///
    /// A missing config file is not an error; the defaults cover it. A
    /// present but unreadable or invalid file is.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = ?self.config_path, "No config file found, using defaults");
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        self.validate(&file_config)?;
        Ok(self.build(file_config))
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if config.feed.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn build(&self, file_config: FileConfig) -> LoadedConfig {
        let mut warnings = Vec::new();

        let mut location = file_config.location.map(|section| {
            UserLocation::new(section.name.as_str(), section.latitude, section.longitude)
        });
        if let Some(query) = &self.overrides.city {
            match self.resolve_city(query, file_config.cities_file.as_deref()) {
                Ok(selected) => location = Some(selected),
                Err(e) => warnings.push(e.to_string()),
            }
        }

        let radius_km = normalize_radius(
            self.overrides
                .radius_km
                .unwrap_or(file_config.alerts.radius_km),
        );

        let watch = WatchConfig {
            feed: self.overrides.feed.unwrap_or(file_config.feed.key),
            min_magnitude: self
                .overrides
                .min_magnitude
                .unwrap_or(file_config.feed.min_magnitude),
            poll_interval: Duration::from_secs(file_config.feed.poll_interval_secs),
            location,
            radius_km,
        };

        LoadedConfig {
            watch,
            audio_cue: file_config.audio_cue,
            warnings,
        }
    }

    fn resolve_city(
        &self,
        query: &str,
        cities_file: Option<&Path>,
    ) -> Result<UserLocation, cities::CityError> {
        let path = cities_file.ok_or(cities::CityError::NoCityList)?;
        let list = cities::load_cities(path)?;
        cities::resolve_city(&list, query)
    }
}

/// Clamp a configured radius to the default when it is unusable.
pub fn normalize_radius(radius: f64) -> f64 {
    if radius.is_finite() && radius > 0.0 {
        radius
    } else {
        DEFAULT_REGIONAL_RADIUS_KM
    }
}
