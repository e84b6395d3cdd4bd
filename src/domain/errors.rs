//! Domain error types
//!
//! This module defines the error hierarchy for Rounds. All errors are
//! domain-specific and don't expose third-party types: transport and parsing
//! failures from the HTTP layer are flattened into [`NetworkError`].

use thiserror::Error;

/// Main Rounds error type
///
/// This is the primary error type used throughout the application.
/// It separates the three failure classes the client reasons about:
/// network failures, local validation failures, and stale-scope responses.
#[derive(Debug, Error)]
pub enum RoundsError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport or HTTP errors from the remote API
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Input rejected locally before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// A response arrived for a filter context that has since been replaced
    #[error("Stale scope: response issued under scope {issued}, current scope is {current}")]
    StaleScope { issued: u64, current: u64 },

    /// No session is active
    #[error("Not signed in")]
    NotSignedIn,

    /// Invalid state transition or missing local entity
    #[error("State error: {0}")]
    State(String),

    /// Local persisted storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl RoundsError {
    /// Whether this error is a stale-scope discard rather than a real failure
    pub fn is_stale_scope(&self) -> bool {
        matches!(self, RoundsError::StaleScope { .. })
    }

    /// Whether this error was raised by local validation
    pub fn is_validation(&self) -> bool {
        matches!(self, RoundsError::Validation(_))
    }
}

/// Remote API errors
///
/// Errors that occur when talking to the Rounds API server.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Failed to reach the server
    #[error("Failed to connect to API server: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Credentials rejected (401, or 400 on login)
    #[error("Authentication failed: {status} - {message}")]
    Unauthorized { status: u16, message: String },

    /// Caller is not allowed to touch this resource (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Other client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    /// Build the error matching an HTTP status code and response body
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => NetworkError::Unauthorized { status, message },
            403 => NetworkError::Forbidden(message),
            404 => NetworkError::NotFound(message),
            500..=599 => NetworkError::ServerError { status, message },
            _ => NetworkError::ClientError { status, message },
        }
    }

    /// HTTP-style status carried by this failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Unauthorized { status, .. }
            | NetworkError::ServerError { status, .. }
            | NetworkError::ClientError { status, .. } => Some(*status),
            NetworkError::Forbidden(_) => Some(403),
            NetworkError::NotFound(_) => Some(404),
            NetworkError::ConnectionFailed(_)
            | NetworkError::Timeout(_)
            | NetworkError::InvalidResponse(_) => None,
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            NetworkError::ConnectionFailed(_)
                | NetworkError::Timeout(_)
                | NetworkError::ServerError { .. }
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for RoundsError {
    fn from(err: std::io::Error) -> Self {
        RoundsError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for RoundsError {
    fn from(err: serde_json::Error) -> Self {
        RoundsError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for RoundsError {
    fn from(err: toml::de::Error) -> Self {
        RoundsError::Configuration(format!("TOML parse error: {err}"))
    }
}
