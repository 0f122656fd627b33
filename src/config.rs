//! Configuration management for the zipcode weather service
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, and validates all settings before the server starts.

use crate::error::ConfigError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::env;
use std::path::PathBuf;

/// Prefix for structured environment overrides, e.g. `ZIPWEATHER_SERVER__PORT`
pub const ENV_PREFIX: &str = "ZIPWEATHER";

/// Root configuration structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Zipcode lookup service settings
    pub locality: LocalityConfig,
    /// Weather API settings
    pub weather: WeatherConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a whole request, both upstream calls included
    pub request_timeout_seconds: u32,
    /// PEM certificate chain; TLS is enabled when both paths are set
    pub tls_cert_path: Option<PathBuf>,
    pub tls_key_path: Option<PathBuf>,
}

/// Zipcode lookup service settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalityConfig {
    pub base_url: String,
    pub timeout_seconds: u32,
}

/// Weather API configuration settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Weather API key (required)
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
    /// Base URL for weather API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
    /// OTLP/HTTP collector endpoint; spans are exported when set
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u32 {
    30
}

fn default_locality_base_url() -> String {
    "https://viacep.com.br".to_string()
}

fn default_weather_base_url() -> String {
    "http://api.weatherapi.com".to_string()
}

fn default_upstream_timeout() -> u32 {
    10
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
            request_timeout_seconds: default_request_timeout(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for LocalityConfig {
    fn default() -> Self {
        Self {
            base_url: default_locality_base_url(),
            timeout_seconds: default_upstream_timeout(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_upstream_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(SecretString::from))
}

impl ServerConfig {
    /// TLS certificate and key, when both are configured
    #[must_use]
    pub fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.tls_cert_path.as_ref().zip(self.tls_key_path.as_ref())
    }
}

impl ServiceConfig {
    /// Load configuration from `config_path` (or `./config.toml`) and the environment
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with ZIPWEATHER_ prefix
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ServiceConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_plain_env()?;
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Honor the bare `PORT` and `WEATHER_API_KEY` variables used by container platforms
    fn apply_plain_env(&mut self) -> Result<()> {
        if let Ok(port) = env::var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::new(format!("PORT must be a port number, got '{port}'")))?;
        }
        if let Ok(key) = env::var("WEATHER_API_KEY") {
            self.weather.api_key = Some(SecretString::from(key));
        }
        Ok(())
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.locality.base_url.is_empty() {
            self.locality.base_url = default_locality_base_url();
        }
        if self.locality.timeout_seconds == 0 {
            self.locality.timeout_seconds = default_upstream_timeout();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_upstream_timeout();
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
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// The weather API key is the only mandatory setting
    pub fn validate_api_key(&self) -> Result<()> {
        match &self.weather.api_key {
            None => Err(ConfigError::new(
                "Weather API key is required. Set WEATHER_API_KEY or weather.api_key.",
            )
            .into()),
            Some(key) if key.expose_secret().trim().is_empty() => {
                Err(ConfigError::new("Weather API key cannot be empty").into())
            }
            Some(_) => Ok(()),
        }
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            ("server.request_timeout_seconds", self.server.request_timeout_seconds),
            ("locality.timeout_seconds", self.locality.timeout_seconds),
            ("weather.timeout_seconds", self.weather.timeout_seconds),
        ];
        for (name, value) in timeouts {
            if value > 300 {
                return Err(ConfigError::new(format!("{name} cannot exceed 300 seconds")).into());
            }
        }

        // Upstream timeouts must surface as 404/500 before the request-level 408
        let upstream_total = self.locality.timeout_seconds + self.weather.timeout_seconds;
        if self.server.request_timeout_seconds <= upstream_total {
            return Err(ConfigError::new(format!(
                "server.request_timeout_seconds ({}) must exceed locality.timeout_seconds + weather.timeout_seconds ({})",
                self.server.request_timeout_seconds, upstream_total
            ))
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::new(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::new(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("locality.base_url", &self.locality.base_url),
            ("weather.base_url", &self.weather.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(
                    ConfigError::new(format!("{name} must be a valid HTTP or HTTPS URL")).into(),
                );
            }
        }

        if self.server.tls_cert_path.is_some() != self.server.tls_key_path.is_some() {
            return Err(ConfigError::new(
                "server.tls_cert_path and server.tls_key_path must be set together",
            )
            .into());
        }

        Ok(())
    }
}
