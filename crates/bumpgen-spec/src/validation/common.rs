//! Common validation utilities shared across backends.
//!
//! This module provides reusable validation functions for common parameter types
//! like resolutions, blur radii, and finite scalars.

use std::fmt;

/// Error type for common validation failures.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonValidationError {
    /// Human-readable error message.
    pub message: String,
}

impl CommonValidationError {
    /// Creates a new validation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommonValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommonValidationError {}

/// Validate that resolution is positive and doesn't overflow.
///
/// # Example
/// ```
/// use bumpgen_spec::validation::common::validate_resolution;
///
/// assert!(validate_resolution(1024, 1024).is_ok());
/// assert!(validate_resolution(0, 100).is_err());
/// ```
pub fn validate_resolution(width: u32, height: u32) -> Result<(), CommonValidationError> {
    if width == 0 || height == 0 {
        return Err(CommonValidationError::new(format!(
            "resolution must be at least 1x1, got [{}, {}]",
            width, height
        )));
    }

    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| {
            CommonValidationError::new(format!(
                "resolution is too large: [{}, {}]",
                width, height
            ))
        })?;

    Ok(())
}

/// Validate that a value is finite.
pub fn validate_finite(name: &str, value: f64) -> Result<(), CommonValidationError> {
    if !value.is_finite() {
        return Err(CommonValidationError::new(format!(
            "{} must be finite, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Validate that a value is positive (> 0).
///
/// # Example
/// ```
/// use bumpgen_spec::validation::common::validate_positive;
///
/// assert!(validate_positive("sigma", 1.5).is_ok());
/// assert!(validate_positive("sigma", 0.0).is_err());
/// ```
pub fn validate_positive(name: &str, value: f64) -> Result<(), CommonValidationError> {
    validate_finite(name, value)?;
    if value <= 0.0 {
        return Err(CommonValidationError::new(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}
