//! Option validation.
//!
//! [`validate_options`] collects every problem in a [`BumpOptions`] record
//! instead of stopping at the first one, so a UI can show them all at once.

pub mod common;

use crate::error::{ErrorCode, ValidationError, ValidationResult, ValidationWarning, WarningCode};
use crate::options::{BumpOptions, STRENGTH_MAX, STRENGTH_MIN};

use common::{validate_finite, validate_positive};

/// Validate a full option record.
pub fn validate_options(options: &BumpOptions) -> ValidationResult {
    let mut result = ValidationResult::success();

    for (path, sigma) in [("sigma1", options.sigma1), ("sigma2", options.sigma2)] {
        if let Err(e) = validate_positive(path, sigma) {
            result.add_error(ValidationError::with_path(
                ErrorCode::InvalidSigma,
                e.message,
                path,
            ));
        }
    }

    for (path, value) in [
        ("height_scale", options.height_scale),
        ("threshold", options.threshold),
    ] {
        if let Err(e) = validate_finite(path, value) {
            result.add_error(ValidationError::with_path(
                ErrorCode::NonFiniteValue,
                e.message,
                path,
            ));
        }
    }

    match validate_finite("strength", options.strength) {
        Err(e) => result.add_error(ValidationError::with_path(
            ErrorCode::NonFiniteValue,
            e.message,
            "strength",
        )),
        Ok(()) => {
            if !(STRENGTH_MIN..=STRENGTH_MAX).contains(&options.strength) {
                result.add_warning(ValidationWarning::with_path(
                    WarningCode::StrengthClamped,
                    format!(
                        "strength {} is outside [{}, {}] and will be clamped to {}",
                        options.strength,
                        STRENGTH_MIN,
                        STRENGTH_MAX,
                        options.effective_strength()
                    ),
                    "strength",
                ));
            }
        }
    }

    if result.is_ok() && options.sigma1 == options.sigma2 {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::DegenerateDog,
            "sigma1 equals sigma2; the height map will be uniformly neutral",
            "sigma2",
        ));
    }

    result
}
