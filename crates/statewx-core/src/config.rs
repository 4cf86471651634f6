use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use statewx_weather::{Endpoints, NOMINATIM_SEARCH_URL, NWS_API_BASE, REQUEST_TIMEOUT_SECS, USER_AGENT};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Environment variable prefix for overrides, e.g. `STATEWX__SERVICES__TIMEOUT_SECS=10`
const ENV_PREFIX: &str = "STATEWX";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Upstream service settings
    #[serde(default)]
    pub services: ServiceConfig,

    /// Defaults used when no state code is given
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Nominatim search endpoint
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// National Weather Service API base
    #[serde(default = "default_nws_api_url")]
    pub nws_api_url: String,

    /// User-Agent sent to both services (NWS rejects requests without one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("statewx")
}

fn default_nominatim_url() -> String {
    NOMINATIM_SEARCH_URL.to_string()
}

fn default_nws_api_url() -> String {
    NWS_API_BASE.to_string()
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            nws_api_url: default_nws_api_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Client settings for the weather and geocoding modules
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            nominatim_url: self.nominatim_url.clone(),
            nws_api_url: self.nws_api_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: self.timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Two-letter US state code
    #[serde(default = "default_state_code")]
    pub state_code: String,
}

fn default_state_code() -> String {
    "CA".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            state_code: default_state_code(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            services: ServiceConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::default().save_to(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load a TOML file layered with `STATEWX__*` environment overrides.
    ///
    /// A missing file yields defaults plus overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = settings
            .try_deserialize::<Config>()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(anyhow::Error::new(ConfigError::Invalid(validation.error_summary()))
                .context("Configuration validation failed"));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.services.nominatim_url,
            "services.nominatim_url",
            &mut result,
        );
        self.validate_url(
            &self.services.nws_api_url,
            "services.nws_api_url",
            &mut result,
        );

        if self.services.user_agent.trim().is_empty() {
            result.add_error(
                "services.user_agent",
                "User-Agent must not be empty (api.weather.gov rejects anonymous requests)",
            );
        }

        if self.services.timeout_secs == 0 {
            result.add_error("services.timeout_secs", "Timeout must be greater than 0");
        } else if self.services.timeout_secs > 120 {
            result.add_warning(
                "services.timeout_secs",
                "Timeout is unusually long (>120 seconds)",
            );
        }

        let code = &self.defaults.state_code;
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            result.add_warning(
                "defaults.state_code",
                format!("Expected a two-letter state code, got: {:?}", code),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Write the configuration as pretty TOML, creating parent directories
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("statewx");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = Config::default().services.endpoints();
        assert_eq!(endpoints.nws_api_url, "https://api.weather.gov");
        assert_eq!(endpoints.user_agent, "weather-app/1.0");
        assert_eq!(endpoints.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.services.nws_api_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "services.nws_api_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.services.nominatim_url = "ftp://nominatim.openstreetmap.org/search".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = Config::default();
        config.services.timeout_secs = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "services.timeout_secs"));
    }

    #[test]
    fn test_bad_state_code_is_warning() {
        let mut config = Config::default();
        config.defaults.state_code = "California".to_string();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "defaults.state_code"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statewx").join("config.toml");

        let mut config = Config::default();
        config.services.nws_api_url = "http://localhost:9000".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.services.nws_api_url, "http://localhost:9000");
        assert_eq!(loaded.services.nominatim_url, NOMINATIM_SEARCH_URL);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[services]\nuser_agent = \"my-station/2.0\"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.services.user_agent, "my-station/2.0");
        assert_eq!(loaded.services.nws_api_url, NWS_API_BASE);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[services\nuser_agent = ").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_environment_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        std::env::set_var("STATEWX__DEFAULTS__STATE_CODE", "WA");
        let loaded = Config::load_from(&path);
        std::env::remove_var("STATEWX__DEFAULTS__STATE_CODE");

        assert_eq!(loaded.unwrap().defaults.state_code, "WA");
    }
}
