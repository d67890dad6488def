//! Option record for height and normal map generation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OptionsError, ValidationResult};
use crate::validation::validate_options;

/// Lower bound applied to `strength`.
pub const STRENGTH_MIN: f64 = 0.01;
/// Upper bound applied to `strength`.
pub const STRENGTH_MAX: f64 = 10.0;

/// Stencil used to estimate the height gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientMethod {
    /// Central difference; missing border neighbors fall back to the center sample.
    #[default]
    Central,
    /// 3x3 Sobel with clamped borders.
    Sobel,
    /// 3x3 Prewitt with clamped borders.
    Prewitt,
}

impl GradientMethod {
    /// All supported methods, in declaration order.
    pub const ALL: [GradientMethod; 3] = [
        GradientMethod::Central,
        GradientMethod::Sobel,
        GradientMethod::Prewitt,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            GradientMethod::Central => "central",
            GradientMethod::Sobel => "sobel",
            GradientMethod::Prewitt => "prewitt",
        }
    }
}

impl fmt::Display for GradientMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradientMethod {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        GradientMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                OptionsError::InvalidParameter(format!(
                    "unknown gradient method '{}', expected one of: central, sobel, prewitt",
                    s
                ))
            })
    }
}

/// Configuration for deriving height and normal maps from a source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BumpOptions {
    /// Sigma of the first (fine) Gaussian blur.
    #[serde(default = "default_sigma1")]
    pub sigma1: f64,
    /// Sigma of the second (coarse) Gaussian blur.
    #[serde(default = "default_sigma2")]
    pub sigma2: f64,
    /// Multiplier applied to the DoG value before offsetting from neutral gray.
    #[serde(default = "default_height_scale")]
    pub height_scale: f64,
    /// DoG magnitudes at or below this value resolve to neutral height.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Gradient stencil for the normal map.
    #[serde(default)]
    pub gradient_method: GradientMethod,
    /// Gradient multiplier; clamped to [0.01, 10.0] when applied.
    #[serde(default = "default_strength")]
    pub strength: f64,
}

fn default_sigma1() -> f64 {
    1.0
}

fn default_sigma2() -> f64 {
    2.0
}

fn default_height_scale() -> f64 {
    1.0
}

fn default_threshold() -> f64 {
    0.1
}

fn default_strength() -> f64 {
    1.0
}

impl Default for BumpOptions {
    fn default() -> Self {
        Self {
            sigma1: default_sigma1(),
            sigma2: default_sigma2(),
            height_scale: default_height_scale(),
            threshold: default_threshold(),
            gradient_method: GradientMethod::default(),
            strength: default_strength(),
        }
    }
}

impl BumpOptions {
    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize options to pretty JSON.
    pub fn to_json(&self) -> Result<String, OptionsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Strength with the [0.01, 10.0] clamp applied.
    pub fn effective_strength(&self) -> f64 {
        self.strength.clamp(STRENGTH_MIN, STRENGTH_MAX)
    }

    /// Validate all fields, collecting every error and warning.
    pub fn validate(&self) -> ValidationResult {
        validate_options(self)
    }
}
