//! Engine configuration file support.
//!
//! This module provides utilities for reading engine configuration from
//! TOML configuration files. Every setting has a default, so an empty file
//! (or no file at all) yields a working configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult, ErrorContext};
use crate::features::LagMode;
use crate::predictors::CategoryVocabulary;

/// Engine configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub projection: ProjectionSettings,
    #[serde(default)]
    pub forecast: ForecastSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub vocabulary: Option<VocabularySettings>,
    #[serde(default)]
    pub server: ServerSettings,
}

/// How future feature rows are derived from history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSettings {
    /// Trailing observations averaged for weather/congestion context.
    #[serde(default = "default_context_window_days")]
    pub context_window_days: usize,
    /// Trailing observations averaged for the units-sold lag seed.
    #[serde(default = "default_seed_window_days")]
    pub seed_window_days: usize,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    #[serde(default = "default_rainfall")]
    pub default_rainfall: f64,
    #[serde(default = "default_congestion_index")]
    pub default_congestion_index: f64,
}

/// Demand forecasting settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSettings {
    #[serde(default)]
    pub lag_mode: LagMode,
}

/// Request defaults used when the caller omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default = "default_horizon_days")]
    pub default_horizon_days: usize,
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,
}

/// Category vocabulary the demand model was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularySettings {
    #[serde(default = "default_vocabulary_version")]
    pub version: String,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

/// HTTP bind settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_context_window_days() -> usize {
    60
}

fn default_seed_window_days() -> usize {
    30
}

fn default_temperature() -> f64 {
    20.0
}

fn default_rainfall() -> f64 {
    0.0
}

fn default_congestion_index() -> f64 {
    0.5
}

fn default_horizon_days() -> usize {
    30
}

fn default_threshold() -> f64 {
    0.3
}

fn default_vocabulary_version() -> String {
    "v1".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            context_window_days: default_context_window_days(),
            seed_window_days: default_seed_window_days(),
            default_temperature: default_temperature(),
            default_rainfall: default_rainfall(),
            default_congestion_index: default_congestion_index(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            default_horizon_days: default_horizon_days(),
            default_threshold: default_threshold(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl VocabularySettings {
    pub fn to_vocabulary(&self) -> CategoryVocabulary {
        CategoryVocabulary::new(
            self.version.clone(),
            self.products.clone(),
            self.locations.clone(),
        )
    }
}

impl EngineConfig {
    /// Load engine configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(EngineConfig)` if successful
    /// * `Err(CoreError)` if the file cannot be read, parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            CoreError::configuration(format!("Failed to read config file: {}", e))
                .with_operation("load_config")
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let config: EngineConfig = toml::from_str(content).map_err(|e| {
            CoreError::configuration(format!("Failed to parse config file: {}", e))
                .with_operation("load_config")
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load engine configuration from the default location.
    ///
    /// Searches for `decision.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> CoreResult<Self> {
        match Self::default_location() {
            Some(path) => Self::from_file(path),
            None => Err(CoreError::configuration(
                "No decision.toml found in standard locations",
            )),
        }
    }

    /// First existing `decision.toml` among the standard locations.
    pub fn default_location() -> Option<PathBuf> {
        [
            PathBuf::from("decision.toml"),
            PathBuf::from("backend/decision.toml"),
            PathBuf::from("../decision.toml"),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |entity: &str, details: String| {
            Err(CoreError::Configuration {
                message: format!("invalid value for {}", entity),
                context: ErrorContext::new("validate_config")
                    .with_entity(entity)
                    .with_details(details),
            })
        };

        if self.projection.context_window_days == 0 {
            return invalid("projection.context_window_days", "must be positive".into());
        }
        if self.projection.seed_window_days == 0 {
            return invalid("projection.seed_window_days", "must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.projection.default_congestion_index) {
            return invalid(
                "projection.default_congestion_index",
                format!("{} outside [0, 1]", self.projection.default_congestion_index),
            );
        }
        if self.analysis.default_horizon_days == 0 {
            return invalid("analysis.default_horizon_days", "must be positive".into());
        }
        let t = self.analysis.default_threshold;
        if !(t > 0.0 && t < 1.0) {
            return invalid("analysis.default_threshold", format!("{} outside (0, 1)", t));
        }
        Ok(())
    }

    /// Vocabulary declared in the file, if any.
    pub fn vocabulary(&self) -> Option<CategoryVocabulary> {
        self.vocabulary.as_ref().map(VocabularySettings::to_vocabulary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.projection.context_window_days, 60);
        assert_eq!(config.projection.seed_window_days, 30);
        assert_eq!(config.projection.default_temperature, 20.0);
        assert_eq!(config.projection.default_congestion_index, 0.5);
        assert_eq!(config.forecast.lag_mode, LagMode::Seeded);
        assert_eq!(config.analysis.default_threshold, 0.3);
        assert_eq!(config.server.port, 8080);
        assert!(config.vocabulary().is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[projection]
context_window_days = 45
default_temperature = 18.5

[forecast]
lag_mode = "iterative"

[analysis]
default_horizon_days = 14
default_threshold = 0.25

[vocabulary]
version = "2024-06"
products = ["Chairs", "Tables"]
locations = ["Austin"]

[server]
port = 9090
"#;

        let config = EngineConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.projection.context_window_days, 45);
        assert_eq!(config.projection.seed_window_days, 30);
        assert_eq!(config.projection.default_temperature, 18.5);
        assert_eq!(config.forecast.lag_mode, LagMode::Iterative);
        assert_eq!(config.analysis.default_horizon_days, 14);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);

        let vocab = config.vocabulary().unwrap();
        assert_eq!(vocab.version(), "2024-06");
        assert!(vocab.contains_product("Tables"));
    }

    #[test]
    fn test_example_config_parses() {
        let config = EngineConfig::from_toml_str(include_str!("../decision.example.toml")).unwrap();
        assert_eq!(config.analysis, AnalysisSettings::default());
        assert_eq!(config.vocabulary().unwrap().locations().len(), 2);
    }

    #[test]
    fn test_threshold_out_of_range_is_rejected() {
        let err = EngineConfig::from_toml_str("[analysis]\ndefault_threshold = 1.0\n").unwrap_err();
        assert!(matches!(err, CoreError::Configuration { .. }));
        assert!(err.to_string().contains("analysis.default_threshold"));
    }

    #[test]
    fn test_unknown_lag_mode_is_rejected() {
        let result = EngineConfig::from_toml_str("[forecast]\nlag_mode = \"psychic\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\ndefault_horizon_days = 7").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.analysis.default_horizon_days, 7);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = EngineConfig::from_file("/nonexistent/decision.toml").unwrap_err();
        assert!(matches!(err, CoreError::Configuration { .. }));
    }
}
