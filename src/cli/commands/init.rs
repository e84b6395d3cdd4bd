//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::context::exit_code;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "rounds.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Rounds configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_code::CONFIGURATION);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} and point api.base_url at your server", self.output);
                println!("  2. Optionally set ROUNDS_API_USERNAME and ROUNDS_API_PASSWORD in .env");
                println!("  3. Validate configuration: rounds validate-config");
                println!("  4. Sign in: rounds login");
                println!("  5. List today's patients: rounds patients");
                println!();
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(exit_code::FATAL)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Rounds Configuration File

environment = "development"

[application]
log_level = "info"

[api]
base_url = "http://localhost:8000"
tls_verify = true
timeout_seconds = 30

[client]
default_department = "ALL"
auto_date_interval_seconds = 60
feed_limit = 200

[storage]
path = ".rounds/state.json"

[logging]
local_enabled = true
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Rounds Configuration File
#
# Values of the form ${VAR} are replaced from the environment (and .env).
# Any key can also be overridden with ROUNDS_<SECTION>_<KEY>, for example
# ROUNDS_API_BASE_URL or ROUNDS_CLIENT_DEFAULT_DEPARTMENT.

# development | staging | production
# Production refuses tls_verify = false.
environment = "development"

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# API Server
# ============================================================================
[api]
# Base URL of the Rounds API server
base_url = "https://rounds.example.org/api"

# Credentials used by `rounds login` when none are given on the command line
# username = "${ROUNDS_API_USERNAME}"
# password = "${ROUNDS_API_PASSWORD}"

# TLS/SSL verification
tls_verify = true

# Request timeout in seconds
timeout_seconds = 30

# Retries for read requests (writes are never retried)
[api.retry]
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 10000
backoff_multiplier = 2.0

# ============================================================================
# Client Behaviour
# ============================================================================
[client]
# Department filter at startup: ALL, GENEL, DAHILIYE, KBB, KARDIYOLOJI,
# GOZ, NOROLOJI, CERRAHI or ACIL
default_department = "ALL"

# How often `rounds watch` checks for a new calendar day
auto_date_interval_seconds = 60

# Maximum visits fetched for the report's department feed (1-1000)
feed_limit = 200

# ============================================================================
# Local State
# ============================================================================
[storage]
# Session, filter, favourites and the patient cache
path = ".rounds/state.json"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = true

# Directory for log files
local_path = "./logs"

# Rotation: daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
