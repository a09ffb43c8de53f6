//! Configuration management for `solarsite`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::SiteSurveyError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `solarsite` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSurveyConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Third-party provider endpoints and client identity
    pub providers: ProviderConfig,
    /// Analysis pipeline settings
    pub analysis: AnalysisConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

/// Provider endpoints and client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Client identifier sent as `User-Agent` to every provider
    pub user_agent: String,
    /// Request timeout in seconds; transport defaults apply when unset
    pub timeout_seconds: Option<u64>,
    /// Nominatim-compatible search endpoint
    pub geocoding_url: String,
    /// Overpass-compatible interpreter endpoint
    pub overpass_url: String,
    /// Server-side timeout embedded in the Overpass query
    pub overpass_timeout_seconds: u32,
    /// Open-Meteo-compatible archive endpoint
    pub climate_archive_url: String,
}

/// Analysis pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum features kept per obstacle category
    pub obstacle_limit: usize,
    /// Length of the climate lookback window in years
    pub lookback_years: u32,
    /// Run obstacle collection and climate aggregation concurrently
    pub concurrent_stages: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_user_agent() -> String {
    format!("solarsite/{} (rooftop solar site survey)", crate::VERSION)
}

fn default_geocoding_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_overpass_timeout() -> u32 {
    25
}

fn default_climate_archive_url() -> String {
    "https://archive-api.open-meteo.com/v1/archive".to_string()
}

fn default_obstacle_limit() -> usize {
    100
}

fn default_lookback_years() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: None,
            geocoding_url: default_geocoding_url(),
            overpass_url: default_overpass_url(),
            overpass_timeout_seconds: default_overpass_timeout(),
            climate_archive_url: default_climate_archive_url(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            obstacle_limit: default_obstacle_limit(),
            lookback_years: default_lookback_years(),
            concurrent_stages: true,
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

impl SiteSurveyConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. SOLARSITE_SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("SOLARSITE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SiteSurveyConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("solarsite").join("config.toml"))
    }

    /// Apply default values to fields left empty
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.providers.user_agent.trim().is_empty() {
            self.providers.user_agent = default_user_agent();
        }
        if self.providers.geocoding_url.is_empty() {
            self.providers.geocoding_url = default_geocoding_url();
        }
        if self.providers.overpass_url.is_empty() {
            self.providers.overpass_url = default_overpass_url();
        }
        if self.providers.overpass_timeout_seconds == 0 {
            self.providers.overpass_timeout_seconds = default_overpass_timeout();
        }
        if self.providers.climate_archive_url.is_empty() {
            self.providers.climate_archive_url = default_climate_archive_url();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if let Some(timeout) = self.providers.timeout_seconds {
            if timeout == 0 || timeout > 300 {
                return Err(SiteSurveyError::config(
                    "Provider timeout must be between 1 and 300 seconds",
                )
                .into());
            }
        }

        if self.providers.overpass_timeout_seconds > 300 {
            return Err(
                SiteSurveyError::config("Overpass query timeout cannot exceed 300 seconds").into(),
            );
        }

        if !(1..=1000).contains(&self.analysis.obstacle_limit) {
            return Err(SiteSurveyError::config(
                "Obstacle limit must be between 1 and 1000 per category",
            )
            .into());
        }

        if !(1..=50).contains(&self.analysis.lookback_years) {
            return Err(
                SiteSurveyError::config("Lookback window must be between 1 and 50 years").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SiteSurveyError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SiteSurveyError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let endpoints = [
            ("geocoding", &self.providers.geocoding_url),
            ("overpass", &self.providers.overpass_url),
            ("climate archive", &self.providers.climate_archive_url),
        ];
        for (name, url) in endpoints {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SiteSurveyError::config(format!(
                    "The {name} URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
