//! Configuration management for Rounds.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Rounds uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `ROUNDS_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation of every section on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rounds::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("rounds.toml")?;
//!
//! println!("API: {}", config.api.base_url);
//! println!("Department: {}", config.client.default_department);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`ApiConfig`] - API connection, TLS and retry settings
//! - [`ClientConfig`] - Default department, auto-date interval, feed size
//! - [`StorageConfig`] - Location of the persisted client state
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [api]
//! base_url = "https://rounds.example.org"
//! username = "${ROUNDS_USERNAME}"
//! password = "${ROUNDS_PASSWORD}"
//!
//! [client]
//! default_department = "ALL"
//!
//! [storage]
//! path = ".rounds/state.json"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApiConfig, ApplicationConfig, ClientConfig, Environment, LoggingConfig, RetryConfig,
    RoundsConfig, StorageConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
