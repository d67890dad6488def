//! Tangent-space normal synthesis from gradient fields.

use bumpgen_spec::validation::common::validate_resolution;
use rayon::prelude::*;

use crate::buffer::{PixelBuffer, Rgba, OPAQUE};
use crate::error::TextureError;
use crate::gradient::{check_len, GradientField};

/// Per-pixel unit normals before encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Unit vectors `[x, y, z]` (row-major).
    pub data: Vec<[f64; 3]>,
}

impl VectorField {
    /// Check that the field is non-empty and holds exactly `width * height` vectors.
    pub fn validate(&self) -> Result<(), TextureError> {
        validate_resolution(self.width, self.height)
            .map_err(|e| TextureError::InvalidInput(e.message))?;
        check_len(self.data.len(), self.width, self.height)
    }
}

/// Lift `(dx, dy)` to `(dx, dy, 1)` and normalize.
///
/// A zero-length vector divides by 1 instead, which keeps NaN out of the map.
#[inline]
pub fn lift_normal(dx: f64, dy: f64) -> [f64; 3] {
    let v = [dx, dy, 1.0];
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    let len = if len == 0.0 { 1.0 } else { len };
    v.map(|c| c / len)
}

/// Encode a component in [-1, 1] as a byte value: `floor(clamp(c * 0.5 + 0.5, 0, 1) * 255)`.
#[inline]
pub fn encode_component(c: f64) -> f64 {
    ((c * 0.5 + 0.5).clamp(0.0, 1.0) * 255.0).floor()
}

/// Builds normal maps from gradient fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalSynthesizer;

impl NormalSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Lift and normalize every gradient.
    pub fn to_vector_field(&self, gradients: &GradientField) -> Result<VectorField, TextureError> {
        gradients.validate()?;
        let data = gradients
            .data
            .par_iter()
            .map(|g| lift_normal(g.dx, g.dy))
            .collect();

        Ok(VectorField {
            width: gradients.width,
            height: gradients.height,
            data,
        })
    }

    /// Encode unit vectors into RGB with opaque alpha.
    pub fn encode(&self, vectors: &VectorField) -> Result<PixelBuffer, TextureError> {
        vectors.validate()?;
        let data = vectors
            .data
            .par_iter()
            .map(|v| {
                Rgba::new(
                    encode_component(v[0]),
                    encode_component(v[1]),
                    encode_component(v[2]),
                    OPAQUE,
                )
            })
            .collect();

        Ok(PixelBuffer {
            width: vectors.width,
            height: vectors.height,
            data,
        })
    }

    /// Gradient field to encoded normal map.
    pub fn synthesize(&self, gradients: &GradientField) -> Result<PixelBuffer, TextureError> {
        self.encode(&self.to_vector_field(gradients)?)
    }
}
