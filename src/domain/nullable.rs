//! Serde adapter for columns the API may send as `null`

use serde::{Deserialize, Deserializer};

/// Read an explicit `null` as the field's default
///
/// Pair with `#[serde(default)]` so a missing field reads the same way.
///
/// # Examples
///
/// ```
/// use rounds::domain::{Department, Visit};
///
/// let visit: Visit = serde_json::from_str(
///     r#"{"id": 7, "ts": "2024-05-01T09:00:00", "author": null, "text": null, "department": null}"#,
/// )
/// .unwrap();
/// assert_eq!(visit.department, Department::general());
/// assert!(visit.author.is_empty());
/// ```
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
