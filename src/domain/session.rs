//! Signed-in user session

use crate::config::{secret_string, SecretString};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role as reported by the login endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// An intern; the API calls this role `intern`
    #[default]
    Student,
    Supervisor,
    Admin,
}

impl Role {
    /// Wire name used by the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "intern",
            Role::Supervisor => "supervisor",
            Role::Admin => "admin",
        }
    }

    /// Whether the role may see every author's entries in reports
    pub fn sees_all_authors(&self) -> bool {
        matches!(self, Role::Supervisor | Role::Admin)
    }
}

impl From<String> for Role {
    // Unknown roles get the narrowest view.
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "supervisor" => Role::Supervisor,
            "admin" => Role::Admin,
            _ => Role::Student,
        }
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authenticated session; the token authenticates every API call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub display_name: String,
    pub token: SecretString,
    #[serde(default)]
    pub role: Role,
}

impl Session {
    pub fn new(
        username: impl Into<String>,
        display_name: impl Into<String>,
        token: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
            token: secret_string(token.into()),
            role,
        }
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}
