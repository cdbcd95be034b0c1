//! Argument Validation
//!
//! Precondition helpers used by constructors and configuration loading.

use crate::error::{ContainerError, Result};

/// Returns `value` if it is at least 1.
///
/// # Arguments
/// * `name` - Argument name used in the error message
/// * `value` - Value to check
pub fn require_positive(name: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(ContainerError::InvalidArgument(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(value)
}

/// Returns `value` if it contains at least one non-whitespace character.
pub fn require_non_blank<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(ContainerError::InvalidArgument(format!(
            "{} must not be blank",
            name
        )));
    }
    Ok(value)
}
