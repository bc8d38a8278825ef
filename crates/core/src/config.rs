//! Application configuration.
//!
//! Every section has defaults matching the shipped behaviour, so an empty
//! JSON object (or no file at all) is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::registry::Registry;

/// Errors reading configuration files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the key-value store
    pub data_dir: PathBuf,

    /// Phone number promoted to the admin role on login
    pub admin_phone: String,

    /// Optional JSON file replacing the seed registry
    pub registry_path: Option<PathBuf>,

    /// Routing settings
    pub routing: RoutingConfig,

    /// Duplicate detection settings
    pub duplicates: DuplicateConfig,

    /// Reverse geocoding settings
    pub geocoder: GeocoderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".civic"),
            admin_phone: "90844 63472".to_string(),
            registry_path: None,
            routing: RoutingConfig::default(),
            duplicates: DuplicateConfig::default(),
            geocoder: GeocoderConfig::default(),
        }
    }
}

impl Config {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_json(path.as_ref())
    }

    /// The registry to route against: the override file if set, else the seed.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        match &self.registry_path {
            Some(path) => read_json(path),
            None => Ok(Registry::seed()),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Axis-aligned latitude/longitude box. Bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Strict containment.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat > self.min_lat && lat < self.max_lat && lng > self.min_lng && lng < self.max_lng
    }
}

/// Routing engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// High-traffic area worth a priority bonus
    pub city_center: BoundingBox,

    /// Hours before this count as off-hours
    pub day_start_hour: u32,

    /// Hours after this count as off-hours
    pub day_end_hour: u32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            city_center: BoundingBox {
                min_lat: 23.3,
                max_lat: 23.4,
                min_lng: 85.25,
                max_lng: 85.35,
            },
            day_start_hour: 6,
            day_end_hour: 22,
        }
    }
}

impl RoutingConfig {
    /// Whether `hour` (0-23, local) is outside the working day.
    pub fn is_off_hours(&self, hour: u32) -> bool {
        hour < self.day_start_hour || hour > self.day_end_hour
    }
}

/// Weights of the four similarity components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    pub location: f64,
    pub text: f64,
    pub category: f64,
    pub time: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            location: 0.4,
            text: 0.3,
            category: 0.2,
            time: 0.1,
        }
    }
}

/// Duplicate detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateConfig {
    /// Overall similarity must exceed this
    pub threshold: f64,

    /// Distance in degrees at which location similarity reaches zero
    pub radius_degrees: f64,

    /// Days apart at which time similarity reaches zero
    pub window_days: f64,

    /// Component weights
    pub weights: SimilarityWeights,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            radius_degrees: 0.01,
            window_days: 7.0,
            weights: SimilarityWeights::default(),
        }
    }
}

/// Reverse geocoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Nominatim-compatible reverse endpoint
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org/reverse".to_string(),
            timeout_secs: 5,
            user_agent: "CivicSense-App/1.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_override() {
        let config: Config =
            serde_json::from_str(r#"{"duplicates": {"threshold": 0.8}, "admin_phone": "9999999999"}"#)
                .unwrap();
        assert_eq!(config.duplicates.threshold, 0.8);
        assert_eq!(config.duplicates.radius_degrees, 0.01);
        assert_eq!(config.admin_phone, "9999999999");
    }

    #[test]
    fn test_off_hours() {
        let routing = RoutingConfig::default();
        assert!(routing.is_off_hours(5));
        assert!(!routing.is_off_hours(6));
        assert!(!routing.is_off_hours(22));
        assert!(routing.is_off_hours(23));
    }

    #[test]
    fn test_city_center_is_exclusive() {
        let center = RoutingConfig::default().city_center;
        assert!(center.contains(23.35, 85.3));
        assert!(!center.contains(23.3, 85.3));
        assert!(!center.contains(28.61, 77.2));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_default_registry_is_seed() {
        assert_eq!(Config::default().registry().unwrap(), Registry::seed());
    }
}
