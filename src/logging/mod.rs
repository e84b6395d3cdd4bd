//! Logging and observability
//!
//! Structured logging through `tracing`, with JSON file output and rotation
//! handled by [`init_logging`].
//!
//! # Example
//!
//! ```no_run
//! use rounds::logging::init_logging;
//! use rounds::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(department = "ACIL", "Patient list refreshed");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a change of the day/department scope
///
/// # Example
///
/// ```no_run
/// use rounds::log_scope_change;
///
/// log_scope_change!(4, "2024-05-01 / ACIL");
/// ```
#[macro_export]
macro_rules! log_scope_change {
    ($token:expr, $filter:expr) => {
        tracing::info!(
            scope = $token,
            filter = %$filter,
            "Scope changed"
        );
    };
}

/// Log a forced full resync after a failed write
///
/// # Example
///
/// ```no_run
/// use rounds::log_resync;
///
/// log_resync!("create_visit", "Network error: connection refused");
/// ```
#[macro_export]
macro_rules! log_resync {
    ($operation:expr, $reason:expr) => {
        tracing::warn!(
            operation = $operation,
            reason = %$reason,
            "Write failed, resyncing from server"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use rounds::log_error_with_context;
/// use rounds::domain::RoundsError;
///
/// let error = RoundsError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use rounds::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying request"
        );
    };
}
