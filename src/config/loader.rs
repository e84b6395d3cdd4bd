//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::RoundsConfig;
use super::secret::secret_string;
use crate::domain::errors::RoundsError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into RoundsConfig
/// 4. Applies environment variable overrides (ROUNDS_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use rounds::config::loader::load_config;
///
/// let config = load_config("rounds.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<RoundsConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RoundsError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RoundsError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<RoundsConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: RoundsConfig = toml::from_str(&contents)
        .map_err(|e| RoundsError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        RoundsError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| RoundsError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        // Comments are copied through untouched
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(RoundsError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Parses a numeric override, naming the variable on failure
fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        RoundsError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using ROUNDS_* prefix
///
/// Environment variables follow the pattern: ROUNDS_<SECTION>_<KEY>
/// For example: ROUNDS_API_BASE_URL, ROUNDS_CLIENT_DEFAULT_DEPARTMENT
fn apply_env_overrides(config: &mut RoundsConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("ROUNDS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // API overrides
    if let Ok(val) = std::env::var("ROUNDS_API_BASE_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("ROUNDS_API_USERNAME") {
        config.api.username = Some(val);
    }
    if let Ok(val) = std::env::var("ROUNDS_API_PASSWORD") {
        config.api.password = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("ROUNDS_API_TLS_VERIFY") {
        config.api.tls_verify = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("ROUNDS_API_TIMEOUT_SECONDS") {
        config.api.timeout_seconds = parse_override("ROUNDS_API_TIMEOUT_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("ROUNDS_API_RETRY_MAX_RETRIES") {
        config.api.retry.max_retries = parse_override("ROUNDS_API_RETRY_MAX_RETRIES", &val)?;
    }

    // Client overrides
    if let Ok(val) = std::env::var("ROUNDS_CLIENT_DEFAULT_DEPARTMENT") {
        config.client.default_department = val.into();
    }
    if let Ok(val) = std::env::var("ROUNDS_CLIENT_AUTO_DATE_INTERVAL_SECONDS") {
        config.client.auto_date_interval_seconds =
            parse_override("ROUNDS_CLIENT_AUTO_DATE_INTERVAL_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("ROUNDS_CLIENT_FEED_LIMIT") {
        config.client.feed_limit = parse_override("ROUNDS_CLIENT_FEED_LIMIT", &val)?;
    }

    // Storage overrides
    if let Ok(val) = std::env::var("ROUNDS_STORAGE_PATH") {
        config.storage.path = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("ROUNDS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("ROUNDS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("ROUNDS_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("ROUNDS_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${ROUNDS_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("ROUNDS_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("ROUNDS_LOADER_MISSING_VAR");
        let input = "password = \"${ROUNDS_LOADER_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# password = \"${ROUNDS_LOADER_COMMENTED}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${ROUNDS_LOADER_COMMENTED}"));
    }

    #[test]
    fn test_parse_override_rejects_garbage() {
        assert_eq!(parse_override::<u64>("X", " 30 ").unwrap(), 30);
        assert!(parse_override::<u64>("X", "thirty").is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-rounds.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "info"

[api]
base_url = "https://rounds.example.org"

[client]
default_department = "acil"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://rounds.example.org");
        assert_eq!(config.client.default_department.to_string(), "ACIL");
        assert_eq!(config.client.feed_limit, 200);
    }
}
