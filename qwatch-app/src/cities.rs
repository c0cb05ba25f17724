//! Static city list for the `--city` location selector.
//!
//! The list is a JSON array of `{name, country, lat, lon}` entries pointed
//! at by `cities_file` in the config. Lookup failures are reported to the
//! user through the transient banner channel; they never abort startup.

use qwatch_core::entities::UserLocation;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CityError {
    #[error("no city list configured; set cities_file in the config")]
    NoCityList,

    #[error("failed to read city list: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse city list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown city: {0}")]
    Unknown(String),
}

/// One selectable city.
#[derive(Debug, Clone, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

/// Load the city list from `path`.
pub fn load_cities(path: &Path) -> Result<Vec<City>, CityError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Resolve a `--city` query against the list.
///
/// Matching is case-insensitive, exact name first, then a unique name
/// prefix. An ambiguous prefix counts as unknown.
pub fn resolve_city(cities: &[City], query: &str) -> Result<UserLocation, CityError> {
    let query_lower = query.to_lowercase();

    if let Some(city) = cities
        .iter()
        .find(|c| c.name.to_lowercase() == query_lower)
    {
        return Ok(UserLocation::new(city.name.as_str(), city.lat, city.lon));
    }

    let mut prefix_matches = cities
        .iter()
        .filter(|c| c.name.to_lowercase().starts_with(&query_lower));
    match (prefix_matches.next(), prefix_matches.next()) {
        (Some(city), None) => Ok(UserLocation::new(city.name.as_str(), city.lat, city.lon)),
        _ => Err(CityError::Unknown(query.to_string())),
    }
}
