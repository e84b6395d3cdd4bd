//! Configuration schema types
//!
//! This module defines the configuration structure for Rounds.

use crate::config::SecretString;
use crate::domain::filter::DepartmentFilter;
use serde::{Deserialize, Serialize};

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main Rounds configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundsConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Remote API connection
    pub api: ApiConfig,

    /// Client behaviour
    #[serde(default)]
    pub client: ClientConfig,

    /// Local persisted state
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RoundsConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate(&self.environment)?;
        self.client.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry configuration for idempotent API reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.backoff_multiplier < 1.0 {
            return Err("api.retry.backoff_multiplier must be >= 1.0".to_string());
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err("api.retry.initial_delay_ms must not exceed max_delay_ms".to_string());
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Rounds API
    pub base_url: String,

    /// Username used by `rounds login` when none is given on the command line
    #[serde(default)]
    pub username: Option<String>,

    /// Password used by `rounds login` when none is given on the command line
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// TLS certificate verification enabled
    ///
    /// **SECURITY WARNING**: Disabling TLS verification exposes patient notes to
    /// man-in-the-middle attacks. It is rejected in production environments.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ApiConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("api.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("api.base_url must start with http:// or https://".to_string());
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(format!("api.base_url '{}' is not a valid URL", self.base_url));
        }

        if self.timeout_seconds == 0 {
            return Err("api.timeout_seconds must be > 0".to_string());
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                Set 'tls_verify = true', or set 'environment = \"development\"' for local testing."
                    .to_string(),
            );
        }

        self.retry.validate()?;
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            username: None,
            password: None,
            tls_verify: true,
            timeout_seconds: default_timeout_seconds(),
            retry: RetryConfig::default(),
        }
    }
}

/// Client behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Department filter applied at startup ("ALL" or a department name)
    #[serde(default)]
    pub default_department: DepartmentFilter,

    /// How often `rounds watch` checks whether the calendar day has rolled over
    #[serde(default = "default_auto_date_interval_seconds")]
    pub auto_date_interval_seconds: u64,

    /// Maximum visits requested for the department feed
    #[serde(default = "default_feed_limit")]
    pub feed_limit: u32,
}

impl ClientConfig {
    fn validate(&self) -> Result<(), String> {
        if self.auto_date_interval_seconds == 0 {
            return Err("client.auto_date_interval_seconds must be > 0".to_string());
        }

        if self.feed_limit == 0 || self.feed_limit > 1000 {
            return Err("client.feed_limit must be between 1 and 1000".to_string());
        }

        if let DepartmentFilter::Only(department) = &self.default_department {
            if !department.is_known() {
                return Err(format!(
                    "Unknown client.default_department '{}'. Must be ALL or one of: {}",
                    department,
                    crate::domain::filter::KNOWN_DEPARTMENTS.join(", ")
                ));
            }
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_department: DepartmentFilter::All,
            auto_date_interval_seconds: default_auto_date_interval_seconds(),
            feed_limit: default_feed_limit(),
        }
    }
}

/// Local persisted state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON file holding the session, filter and patient cache
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("storage.path cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_auto_date_interval_seconds() -> u64 {
    60
}

fn default_feed_limit() -> u32 {
    200
}

fn default_storage_path() -> String {
    ".rounds/state.json".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::filter::Department;

    fn sample_config() -> RoundsConfig {
        RoundsConfig {
            application: ApplicationConfig::default(),
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "https://rounds.example.org".to_string(),
                username: Some("esude".to_string()),
                password: Some(secret_string("pass".to_string())),
                ..ApiConfig::default()
            },
            client: ClientConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig {
            log_level: "info".to_string(),
        };

        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_config_validation() {
        let mut config = sample_config();
        assert!(config.validate().is_ok());

        config.api.base_url = "rounds.example.org".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = String::new();
        assert!(config.validate().is_err());

        config.api.base_url = "https://rounds.example.org".to_string();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tls_verification_required_in_production() {
        let mut config = sample_config();
        config.api.tls_verify = false;
        assert!(config.validate().is_ok());

        config.environment = Environment::Production;
        let err = config.validate().unwrap_err();
        assert!(err.contains("TLS certificate verification"));
    }

    #[test]
    fn test_retry_config_validation() {
        let mut retry = RetryConfig::default();
        assert!(retry.validate().is_ok());

        retry.backoff_multiplier = 0.5;
        assert!(retry.validate().is_err());

        retry.backoff_multiplier = 2.0;
        retry.initial_delay_ms = 20_000;
        assert!(retry.validate().is_err());
    }

    #[test]
    fn test_client_config_validation() {
        let mut client = ClientConfig::default();
        assert!(client.validate().is_ok());

        client.default_department = DepartmentFilter::Only(Department::new("kbb"));
        assert!(client.validate().is_ok());

        client.default_department = DepartmentFilter::Only(Department::new("ONKOLOJI"));
        assert!(client.validate().is_err());

        client.default_department = DepartmentFilter::All;
        client.feed_limit = 0;
        assert!(client.validate().is_err());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(config.local_enabled);
        assert_eq!(config.local_rotation, "daily");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_auto_date_interval_seconds(), 60);
        assert_eq!(default_feed_limit(), 200);
        assert_eq!(default_max_retries(), 3);
    }
}
