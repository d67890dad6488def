//! Difference-of-Gaussians height extraction.

use std::time::Instant;

use bumpgen_spec::validation::common::validate_finite;
use rayon::prelude::*;
use tracing::debug;

use crate::blur::SeparableBlur;
use crate::buffer::{PixelBuffer, Rgba, NEUTRAL, OPAQUE};
use crate::error::TextureError;

/// Map a DoG value to a height sample.
///
/// Magnitudes strictly above `threshold` offset the neutral gray by
/// `dog * height_scale` (clamped to [0, 255]); anything at or below it stays
/// at [`NEUTRAL`].
#[inline]
pub fn height_from_dog(dog: f64, threshold: f64, height_scale: f64) -> f64 {
    if dog.abs() > threshold {
        (NEUTRAL + dog * height_scale).clamp(0.0, 255.0)
    } else {
        NEUTRAL
    }
}

/// Per-channel absolute difference of two buffers with alpha forced opaque.
pub fn abs_difference(a: &PixelBuffer, b: &PixelBuffer) -> Result<PixelBuffer, TextureError> {
    if a.dimensions() != b.dimensions() {
        return Err(TextureError::InvalidInput(format!(
            "cannot difference {}x{} and {}x{} buffers",
            a.width, a.height, b.width, b.height
        )));
    }

    let data = a
        .data
        .par_iter()
        .zip(b.data.par_iter())
        .map(|(p, q)| Rgba::opaque((p.r - q.r).abs(), (p.g - q.g).abs(), (p.b - q.b).abs()))
        .collect();

    Ok(PixelBuffer {
        width: a.width,
        height: a.height,
        data,
    })
}

/// Extracts a grayscale height map from the difference of two Gaussian blurs.
#[derive(Debug, Clone, Default)]
pub struct DogHeightExtractor {
    blur: SeparableBlur,
}

impl DogHeightExtractor {
    /// Create an extractor driving `blur`.
    pub fn new(blur: SeparableBlur) -> Self {
        Self { blur }
    }

    /// The blur used for both scales.
    pub fn blur(&self) -> &SeparableBlur {
        &self.blur
    }

    /// Generate a height map: gray RGB, alpha 255, same size as `image`.
    ///
    /// Both blurs read the original image. Equal sigmas give a uniformly
    /// neutral map.
    pub fn generate_height(
        &self,
        image: &PixelBuffer,
        sigma1: f64,
        sigma2: f64,
        threshold: f64,
        height_scale: f64,
    ) -> Result<PixelBuffer, TextureError> {
        image.validate()?;
        validate_finite("threshold", threshold)
            .map_err(|e| TextureError::InvalidParameter(e.message))?;
        validate_finite("height_scale", height_scale)
            .map_err(|e| TextureError::InvalidParameter(e.message))?;
        // Fail on a bad sigma before doing any blur work.
        self.blur.kernel_for(image, sigma1)?;
        self.blur.kernel_for(image, sigma2)?;

        let start = Instant::now();
        let (fine, coarse) = rayon::join(
            || self.blur.blur(image, sigma1),
            || self.blur.blur(image, sigma2),
        );
        let diff = abs_difference(&fine?, &coarse?)?;

        let data = diff
            .data
            .par_iter()
            .map(|p| Rgba::gray(height_from_dog(p.mean_rgb(), threshold, height_scale)))
            .collect();

        debug!(
            width = image.width,
            height = image.height,
            sigma1,
            sigma2,
            threshold,
            elapsed_us = start.elapsed().as_micros() as u64,
            "dog height map"
        );

        Ok(PixelBuffer {
            width: image.width,
            height: image.height,
            data,
        })
    }
}
