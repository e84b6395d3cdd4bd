//! Result type alias for Rounds

use super::errors::RoundsError;

/// Result type alias for Rounds operations
///
/// # Examples
///
/// ```
/// use rounds::domain::result::Result;
/// use rounds::domain::errors::RoundsError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(RoundsError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, RoundsError>;
