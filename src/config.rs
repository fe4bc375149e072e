//! Configuration management for the travel planner
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PlannerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Plain variable names accepted for the two required settings
const ENDPOINT_ENV: &str = "ENDPOINT";
const API_KEY_ENV: &str = "API_KEY";

/// Upper bound of a single backoff delay between model retries
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Time kept back from the server timeout for building the offline plan
pub const FALLBACK_MARGIN: Duration = Duration::from_secs(2);

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Generation service configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Chat-completions endpoint URL (required)
    pub endpoint: Option<String>,
    /// Access credential sent as `api-key` header (required)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u32,
    /// Retries after the first attempt for transport errors and 5xx
    #[serde(default = "default_model_max_retries")]
    pub max_retries: u32,
    /// Base delay of the exponential backoff in milliseconds
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory with a built frontend, served for unmatched paths
    pub static_dir: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    /// PEM certificate chain; enables HTTPS together with `tls_key_path`
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
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
    /// OTLP/HTTP collector base URL; telemetry export is off when unset
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_model_timeout() -> u32 {
    30
}

fn default_model_max_retries() -> u32 {
    2
}

fn default_retry_base_ms() -> u64 {
    200
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_request_timeout() -> u32 {
    120
}

fn default_body_limit() -> usize {
    64 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl ModelConfig {
    /// Longest a batch call can take with every retry and backoff used up
    #[must_use]
    pub fn worst_case_duration(&self) -> Duration {
        let attempts = self.max_retries + 1;
        Duration::from_secs(u64::from(self.timeout_seconds)) * attempts
            + MAX_RETRY_DELAY * self.max_retries
    }
}

impl ServerConfig {
    /// Time the model path may use before a request falls back offline
    #[must_use]
    pub fn model_budget(&self) -> Duration {
        Duration::from_secs(u64::from(self.request_timeout_seconds))
            .saturating_sub(FALLBACK_MARGIN)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_seconds: default_model_timeout(),
            max_retries: default_model_max_retries(),
            retry_base_ms: default_retry_base_ms(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            static_dir: None,
            request_timeout_seconds: default_request_timeout(),
            body_limit_bytes: default_body_limit(),
            tls_cert_path: None,
            tls_key_path: None,
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

impl PlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::read_sources(config_path)?;
        config.resolve_credentials(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;
        Ok(config)
    }

    fn read_sources(config_path: Option<PathBuf>) -> Result<Self> {
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

        // Environment overrides, e.g. PLANNER_MODEL__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("PLANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")
    }

    /// Fill missing credentials from the plain `ENDPOINT` / `API_KEY` variables
    pub fn resolve_credentials(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.model.endpoint.is_none() {
            self.model.endpoint = lookup(ENDPOINT_ENV);
        }
        if self.model.api_key.is_none() {
            self.model.api_key = lookup(API_KEY_ENV);
        }
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("travel-planner").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.model.timeout_seconds == 0 {
            self.model.timeout_seconds = default_model_timeout();
        }
        if self.model.retry_base_ms == 0 {
            self.model.retry_base_ms = default_retry_base_ms();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.server.body_limit_bytes == 0 {
            self.server.body_limit_bytes = default_body_limit();
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
        self.validate_credentials()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the model endpoint and access credential
    pub fn validate_credentials(&self) -> Result<()> {
        let endpoint = self.model.endpoint.as_deref().unwrap_or_default().trim();
        if endpoint.is_empty() {
            return Err(PlannerError::config(format!(
                "Model endpoint is missing. Set {ENDPOINT_ENV} or PLANNER_MODEL__ENDPOINT."
            ))
            .into());
        }

        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(
                PlannerError::config("Model endpoint must be a valid HTTP or HTTPS URL").into(),
            );
        }

        let api_key = self.model.api_key.as_deref().unwrap_or_default().trim();
        if api_key.is_empty() {
            return Err(PlannerError::config(format!(
                "Model API key is missing. Set {API_KEY_ENV} or PLANNER_MODEL__API_KEY."
            ))
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.model.timeout_seconds > 300 {
            return Err(PlannerError::config("Model timeout cannot exceed 300 seconds").into());
        }

        if self.model.max_retries > 10 {
            return Err(PlannerError::config("Model max retries cannot exceed 10").into());
        }

        if Duration::from_millis(self.model.retry_base_ms) > MAX_RETRY_DELAY {
            return Err(PlannerError::config(format!(
                "Retry base delay cannot exceed {} ms",
                MAX_RETRY_DELAY.as_millis()
            ))
            .into());
        }

        if self.server.request_timeout_seconds > 600 {
            return Err(
                PlannerError::config("Server request timeout cannot exceed 600 seconds").into(),
            );
        }

        let worst_case = self.model.worst_case_duration();
        let server_timeout = Duration::from_secs(self.server.request_timeout_seconds.into());
        if worst_case + FALLBACK_MARGIN >= server_timeout {
            return Err(PlannerError::config(format!(
                "Server request timeout ({}s) must exceed the model's worst case of {}s plus {}s for the offline plan. \
                 Raise server.request_timeout_seconds or lower model.timeout_seconds / model.max_retries.",
                self.server.request_timeout_seconds,
                worst_case.as_secs(),
                FALLBACK_MARGIN.as_secs()
            ))
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if self.server.tls_cert_path.is_some() != self.server.tls_key_path.is_some() {
            return Err(PlannerError::config(
                "TLS needs both tls_cert_path and tls_key_path, or neither",
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn configured() -> PlannerConfig {
        let mut config = PlannerConfig::default();
        config.model.endpoint = Some("https://example.openai.azure.com/deployments/gpt".into());
        config.model.api_key = Some("valid_api_key_123".into());
        config
    }

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.model.timeout_seconds, 30);
        assert_eq!(config.model.max_retries, 2);
        assert_eq!(config.model.retry_base_ms, 200);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "info");
        assert!(config.model.endpoint.is_none());
        assert!(config.model.api_key.is_none());
    }

    #[test]
    fn test_missing_credentials_is_a_config_error() {
        let result = PlannerConfig::default().validate();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("endpoint is missing"));

        let mut config = configured();
        config.model.api_key = Some("  ".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("API key is missing"));
    }

    #[test]
    fn test_valid_config() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_endpoint_must_be_http() {
        let mut config = configured();
        config.model.endpoint = Some("ftp://example.com".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("HTTP or HTTPS"));
    }

    #[test]
    fn test_credentials_fall_back_to_plain_variables() {
        let env = HashMap::from([
            ("ENDPOINT", "https://fallback.example.com/chat"),
            ("API_KEY", "from-env"),
        ]);
        let mut config = PlannerConfig::default();
        config.model.api_key = Some("from-file".into());
        config.resolve_credentials(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(
            config.model.endpoint.as_deref(),
            Some("https://fallback.example.com/chat")
        );
        // explicit settings win over the plain variables
        assert_eq!(config.model.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = configured();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = configured();
        config.model.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_default_model_path_fits_in_server_timeout() {
        let config = configured();
        assert_eq!(config.model.worst_case_duration(), Duration::from_secs(100));
        assert_eq!(config.server.model_budget(), Duration::from_secs(118));
        assert!(config.model.worst_case_duration() < config.server.model_budget());
    }

    #[rstest]
    #[case::slow_model(60, 2, 120)]
    #[case::many_retries(30, 4, 120)]
    #[case::short_server_timeout(30, 0, 30)]
    fn test_model_path_longer_than_server_timeout_is_rejected(
        #[case] timeout_seconds: u32,
        #[case] max_retries: u32,
        #[case] request_timeout_seconds: u32,
    ) {
        let mut config = configured();
        config.model.timeout_seconds = timeout_seconds;
        config.model.max_retries = max_retries;
        config.server.request_timeout_seconds = request_timeout_seconds;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must exceed the model's worst case"));
    }

    #[test]
    fn test_retry_base_above_backoff_cap_is_rejected() {
        let mut config = configured();
        config.model.retry_base_ms = 6_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Retry base delay"));
    }

    #[test]
    fn test_tls_needs_both_files() {
        let mut config = configured();
        config.server.tls_cert_path = Some("cert.pem".into());
        assert!(config.validate().is_err());
        config.server.tls_key_path = Some("key.pem".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = configured();
        config.model.timeout_seconds = 0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.model.timeout_seconds, 30);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = PlannerConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("travel-planner"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
