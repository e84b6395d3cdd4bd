//! Input checks applied before any network call

use super::errors::RoundsError;
use super::result::Result;
use std::fmt;

/// Digits in a national identity number
pub const NATIONAL_ID_DIGITS: usize = 11;

/// Shortest acceptable visit note, counted after trimming
pub const MIN_NOTE_CHARS: usize = 20;

/// A national identity number reduced to its digits
///
/// Only the server can turn this into a [`PatientId`](super::ids::PatientId);
/// the raw number is never stored by the client.
///
/// # Examples
///
/// ```
/// use rounds::domain::validation::NationalId;
///
/// let id = NationalId::parse("123 456 789 01").unwrap();
/// assert_eq!(id.as_str(), "12345678901");
/// assert!(NationalId::parse("123").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct NationalId(String);

impl NationalId {
    /// Strip everything but ASCII digits and require exactly eleven
    pub fn parse(input: &str) -> Result<Self> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() != NATIONAL_ID_DIGITS {
            return Err(RoundsError::Validation(format!(
                "National ID must be exactly {NATIONAL_ID_DIGITS} digits (got {})",
                digits.len()
            )));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the full number out of logs.
impl fmt::Debug for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NationalId(*******{})", &self.0[NATIONAL_ID_DIGITS - 4..])
    }
}

/// Check a visit note and return it trimmed
pub fn validate_note_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    let chars = trimmed.chars().count();
    if chars < MIN_NOTE_CHARS {
        return Err(RoundsError::Validation(format!(
            "Note must contain at least {MIN_NOTE_CHARS} characters (got {chars})"
        )));
    }
    Ok(trimmed.to_string())
}
