//! Configuration management for the weathercast application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeathercastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "WEATHERCAST_CONFIG";

/// Root configuration structure for the weathercast application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeathercastConfig {
    /// Model artifact storage and download settings
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where artifacts live locally and where they are fetched from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Local directory holding the artifact files
    #[serde(default = "default_artifact_directory")]
    pub directory: String,
    /// Prefix the remote id is appended to when downloading
    #[serde(default = "default_artifact_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_artifact_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient download failures
    #[serde(default = "default_artifact_max_retries")]
    pub max_retries: u32,
    /// File name and remote id of every artifact
    #[serde(default)]
    pub catalog: ArtifactCatalog,
}

/// A single artifact: local file name plus the remote id it is fetched by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub file_name: String,
    pub remote_id: String,
}

impl ArtifactEntry {
    pub fn new<F: Into<String>, R: Into<String>>(file_name: F, remote_id: R) -> Self {
        Self {
            file_name: file_name.into(),
            remote_id: remote_id.into(),
        }
    }
}

/// The seven artifacts making up a model bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactCatalog {
    #[serde(default = "default_classifier_entry")]
    pub classifier: ArtifactEntry,
    #[serde(default = "default_label_encoder_entry")]
    pub label_encoder: ArtifactEntry,
    #[serde(default = "default_scaler_entry")]
    pub scaler: ArtifactEntry,
    #[serde(default = "default_dew_entry")]
    pub dew_point: ArtifactEntry,
    #[serde(default = "default_humidity_entry")]
    pub humidity: ArtifactEntry,
    #[serde(default = "default_temp_max_entry")]
    pub temp_max: ArtifactEntry,
    #[serde(default = "default_temp_min_entry")]
    pub temp_min: ArtifactEntry,
}

impl ArtifactCatalog {
    /// All entries in download order
    #[must_use]
    pub fn entries(&self) -> [&ArtifactEntry; 7] {
        [
            &self.classifier,
            &self.label_encoder,
            &self.scaler,
            &self.dew_point,
            &self.humidity,
            &self.temp_max,
            &self.temp_min,
        ]
    }
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_artifact_directory() -> String {
    "artifacts".to_string()
}

fn default_artifact_base_url() -> String {
    "https://drive.google.com/uc?export=download&id=".to_string()
}

fn default_artifact_timeout() -> u32 {
    60
}

fn default_artifact_max_retries() -> u32 {
    3
}

fn default_classifier_entry() -> ArtifactEntry {
    ArtifactEntry::new("weather_model_desc.json", "1-uFeHnB0ZWMJi67izsSKARfO_7mVQzYu")
}

fn default_label_encoder_entry() -> ArtifactEntry {
    ArtifactEntry::new("weather_label_encoder.json", "1nAkehTsaQbH10UCZqJiutoP7D0mi2qYK")
}

fn default_scaler_entry() -> ArtifactEntry {
    ArtifactEntry::new("scaler.json", "1M2qIc31NOgOfljPvziABYOeH-aKSvU7E")
}

fn default_dew_entry() -> ArtifactEntry {
    ArtifactEntry::new("weather_model_dew.json", "1Rmwo0ixP3RGlExVRf-TcnAieJeoBGBGR")
}

fn default_humidity_entry() -> ArtifactEntry {
    ArtifactEntry::new("weather_model_hum.json", "1ksYKUxWEAUFgAZViBWQtQeCgVI_yKG7I")
}

fn default_temp_max_entry() -> ArtifactEntry {
    ArtifactEntry::new("weather_model_max.json", "1zwhJfuk7nk4h2iTWRqdto1GnEHvaGOl-")
}

fn default_temp_min_entry() -> ArtifactEntry {
    ArtifactEntry::new("weather_model_min.json", "1jVxcwJv90cyiPq9-z4Uul5s6qfhWGaEp")
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8501
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            directory: default_artifact_directory(),
            base_url: default_artifact_base_url(),
            timeout_seconds: default_artifact_timeout(),
            max_retries: default_artifact_max_retries(),
            catalog: ArtifactCatalog::default(),
        }
    }
}

impl Default for ArtifactCatalog {
    fn default() -> Self {
        Self {
            classifier: default_classifier_entry(),
            label_encoder: default_label_encoder_entry(),
            scaler: default_scaler_entry(),
            dew_point: default_dew_entry(),
            humidity: default_humidity_entry(),
            temp_max: default_temp_max_entry(),
            temp_min: default_temp_min_entry(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeathercastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_from_path(explicit)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. WEATHERCAST_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("WEATHERCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeathercastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weathercast").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.artifacts.directory.is_empty() {
            self.artifacts.directory = default_artifact_directory();
        }
        if self.artifacts.base_url.is_empty() {
            self.artifacts.base_url = default_artifact_base_url();
        }
        if self.artifacts.timeout_seconds == 0 {
            self.artifacts.timeout_seconds = default_artifact_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Local path of the artifact directory
    #[must_use]
    pub fn artifact_dir(&self) -> PathBuf {
        PathBuf::from(&self.artifacts.directory)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_catalog()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.artifacts.timeout_seconds > 600 {
            return Err(
                WeathercastError::config("Artifact download timeout cannot exceed 600 seconds").into(),
            );
        }

        if self.artifacts.max_retries > 10 {
            return Err(WeathercastError::config("Artifact max retries cannot exceed 10").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeathercastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeathercastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.artifacts.base_url.starts_with("http://")
            && !self.artifacts.base_url.starts_with("https://")
        {
            return Err(WeathercastError::config(
                "Artifact base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    /// Every artifact needs a plain, unique file name and a remote id
    fn validate_catalog(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in self.artifacts.catalog.entries() {
            if entry.file_name.is_empty() || entry.remote_id.is_empty() {
                return Err(WeathercastError::config(
                    "Artifact entries need both a file name and a remote id",
                )
                .into());
            }
            if entry.file_name.contains('/') || entry.file_name.contains('\\') {
                return Err(WeathercastError::config(format!(
                    "Artifact file name '{}' must not contain a path separator",
                    entry.file_name
                ))
                .into());
            }
            if !seen.insert(entry.file_name.as_str()) {
                return Err(WeathercastError::config(format!(
                    "Artifact file name '{}' is used more than once",
                    entry.file_name
                ))
                .into());
            }
        }
        Ok(())
    }
}
