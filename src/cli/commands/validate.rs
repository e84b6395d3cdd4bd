//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Rounds configuration file.

use super::context::exit_code;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  API Server: {}", config.api.base_url);
        println!("  TLS Verify: {}", config.api.tls_verify);
        println!(
            "  Login User: {}",
            config.api.username.as_deref().unwrap_or("(pass --username to login)")
        );
        println!("  Default Department: {}", config.client.default_department);
        println!(
            "  Auto-date Check: every {}s",
            config.client.auto_date_interval_seconds
        );
        println!("  Feed Limit: {}", config.client.feed_limit);
        println!("  State File: {}", config.storage.path);
        if config.logging.local_enabled {
            println!(
                "  Log Files: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();
        Ok(exit_code::SUCCESS)
    }
}
