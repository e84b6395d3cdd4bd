//! Domain identifier types with validation
//!
//! Newtype wrappers keep patient and visit identifiers from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Patient identifier newtype wrapper
///
/// The server derives patient identifiers from a national identity number
/// (e.g. `PX-3kq9d0aa`); the client treats them as opaque strings.
///
/// # Examples
///
/// ```
/// use rounds::domain::ids::PatientId;
/// use std::str::FromStr;
///
/// let id = PatientId::from_str("PX-3kq9d0aa").unwrap();
/// assert_eq!(id.as_str(), "PX-3kq9d0aa");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(PatientId)` if the ID is non-empty, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Patient ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

const LOCAL_PREFIX: &str = "local:";

/// Visit identifier
///
/// A visit is identified by the integer id the server assigned to it. Visits
/// created optimistically carry a random placeholder until the server-confirmed
/// list replaces them.
///
/// # Examples
///
/// ```
/// use rounds::domain::ids::VisitId;
/// use std::str::FromStr;
///
/// let confirmed = VisitId::from_str("42").unwrap();
/// assert_eq!(confirmed.server_id(), Some(42));
///
/// let placeholder = VisitId::placeholder();
/// assert!(!placeholder.is_confirmed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisitId {
    /// Id assigned by the server
    Server(i64),
    /// Placeholder for a visit not yet confirmed by the server
    Local(Uuid),
}

impl VisitId {
    /// Generate a fresh placeholder id
    pub fn placeholder() -> Self {
        VisitId::Local(Uuid::new_v4())
    }

    /// Whether the server has assigned this id
    pub fn is_confirmed(&self) -> bool {
        matches!(self, VisitId::Server(_))
    }

    /// The server id, if confirmed
    pub fn server_id(&self) -> Option<i64> {
        match self {
            VisitId::Server(id) => Some(*id),
            VisitId::Local(_) => None,
        }
    }
}

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitId::Server(id) => write!(f, "{id}"),
            VisitId::Local(uuid) => write!(f, "{LOCAL_PREFIX}{uuid}"),
        }
    }
}

impl FromStr for VisitId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix(LOCAL_PREFIX) {
            return Uuid::parse_str(rest)
                .map(VisitId::Local)
                .map_err(|e| format!("Invalid placeholder visit id '{s}': {e}"));
        }
        s.parse::<i64>()
            .map(VisitId::Server)
            .map_err(|_| format!("Invalid visit id '{s}'. Expected an integer"))
    }
}

impl From<i64> for VisitId {
    fn from(id: i64) -> Self {
        VisitId::Server(id)
    }
}
