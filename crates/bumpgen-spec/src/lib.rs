//! bumpgen Option Library
//!
//! This crate provides the configuration record and its validation for
//! the bumpgen height/normal map pipeline. Options are plain serde values so an
//! application shell can persist or transmit them however it likes.
//!
//! # Example
//!
//! ```
//! use bumpgen_spec::{BumpOptions, GradientMethod};
//!
//! let options = BumpOptions {
//!     gradient_method: GradientMethod::Sobel,
//!     strength: 2.5,
//!     ..BumpOptions::default()
//! };
//!
//! assert!(options.validate().is_ok());
//!
//! let json = options.to_json().unwrap();
//! assert_eq!(BumpOptions::from_json(&json).unwrap(), options);
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error codes, validation results, and the backend error trait
//! - [`options`]: The option record and gradient method selector
//! - [`validation`]: Reusable parameter checks

pub mod error;
pub mod options;
pub mod validation;

// Re-export commonly used types at the crate root
pub use error::{
    BackendError, ErrorCode, OptionsError, ValidationError, ValidationResult, ValidationWarning,
    WarningCode,
};
pub use options::{BumpOptions, GradientMethod, STRENGTH_MAX, STRENGTH_MIN};
