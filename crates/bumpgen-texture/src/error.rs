//! Errors from the texture backend.

use thiserror::Error;

use bumpgen_spec::{BackendError, OptionsError};

/// Errors from height and normal map generation.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("generation cancelled before {0}")]
    Cancelled(&'static str),
}

impl From<OptionsError> for TextureError {
    fn from(err: OptionsError) -> Self {
        TextureError::InvalidParameter(err.to_string())
    }
}

impl BackendError for TextureError {
    fn code(&self) -> &'static str {
        match self {
            TextureError::InvalidInput(_) => "TEXTURE_001",
            TextureError::InvalidParameter(_) => "TEXTURE_002",
            TextureError::Cancelled(_) => "TEXTURE_003",
        }
    }

    fn category(&self) -> &'static str {
        "texture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let err = TextureError::InvalidInput("empty".into());
        assert_eq!(err.code(), "TEXTURE_001");
        assert_eq!(err.category(), "texture");
        assert_eq!(err.message(), "Invalid input: empty");

        let err = TextureError::Cancelled("gradient");
        assert_eq!(err.code(), "TEXTURE_003");
        assert_eq!(err.to_string(), "generation cancelled before gradient");
    }

    #[test]
    fn test_options_error_maps_to_invalid_parameter() {
        let err: TextureError = "bogus"
            .parse::<bumpgen_spec::GradientMethod>()
            .unwrap_err()
            .into();
        assert!(matches!(err, TextureError::InvalidParameter(_)));
        assert!(err.to_string().contains("bogus"));
    }
}
