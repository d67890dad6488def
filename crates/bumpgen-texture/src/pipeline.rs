//! Source image to height and normal maps.
//!
//! [`MapGenerator`] runs the fixed stage order
//! blur x2 -> DoG height -> gradient -> normal, each stage reading only the
//! finished output of the previous one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bumpgen_spec::{BumpOptions, GradientMethod};
use tracing::{debug, warn};

use crate::blur::SeparableBlur;
use crate::buffer::PixelBuffer;
use crate::error::TextureError;
use crate::gradient::{compute_gradient, GradientField};
use crate::height::DogHeightExtractor;
use crate::kernel::KernelCache;
use crate::normal::NormalSynthesizer;

/// Height and normal maps derived from one source image.
#[derive(Debug, Clone)]
pub struct BumpMaps {
    /// Gray height map, neutral at 128.
    pub height: PixelBuffer,
    /// Tangent-space normal map.
    pub normal: PixelBuffer,
}

/// Derives bump maps, keeping Gaussian kernels cached across calls.
#[derive(Debug, Clone, Default)]
pub struct MapGenerator {
    extractor: DogHeightExtractor,
    synthesizer: NormalSynthesizer,
}

impl MapGenerator {
    /// Create a generator with an empty kernel cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator sharing an existing kernel cache.
    pub fn with_cache(cache: Arc<KernelCache>) -> Self {
        Self {
            extractor: DogHeightExtractor::new(SeparableBlur::new(cache)),
            synthesizer: NormalSynthesizer::new(),
        }
    }

    /// The kernel cache shared by every blur this generator runs.
    pub fn kernel_cache(&self) -> &Arc<KernelCache> {
        self.extractor.blur().cache()
    }

    /// Gaussian blur at `sigma`.
    pub fn blur(&self, image: &PixelBuffer, sigma: f64) -> Result<PixelBuffer, TextureError> {
        self.extractor.blur().blur(image, sigma)
    }

    /// DoG height map.
    pub fn generate_height(
        &self,
        image: &PixelBuffer,
        sigma1: f64,
        sigma2: f64,
        threshold: f64,
        height_scale: f64,
    ) -> Result<PixelBuffer, TextureError> {
        self.extractor
            .generate_height(image, sigma1, sigma2, threshold, height_scale)
    }

    /// Gradient field of a height map.
    pub fn compute_gradient(
        &self,
        height: &PixelBuffer,
        method: GradientMethod,
        strength: f64,
    ) -> Result<GradientField, TextureError> {
        compute_gradient(height, method, strength)
    }

    /// Encoded normal map of a gradient field.
    pub fn synthesize(&self, gradients: &GradientField) -> Result<PixelBuffer, TextureError> {
        self.synthesizer.synthesize(gradients)
    }

    /// Normal map straight from a height map.
    pub fn generate_normal(
        &self,
        height: &PixelBuffer,
        method: GradientMethod,
        strength: f64,
    ) -> Result<PixelBuffer, TextureError> {
        let gradients = self.compute_gradient(height, method, strength)?;
        self.synthesize(&gradients)
    }

    /// Run the full pipeline.
    pub fn generate(
        &self,
        image: &PixelBuffer,
        options: &BumpOptions,
    ) -> Result<BumpMaps, TextureError> {
        self.generate_with_cancel(image, options, &AtomicBool::new(false))
    }

    /// Run the full pipeline, checking `cancel` between stages.
    ///
    /// A cancelled run returns [`TextureError::Cancelled`] and no maps.
    pub fn generate_with_cancel(
        &self,
        image: &PixelBuffer,
        options: &BumpOptions,
        cancel: &AtomicBool,
    ) -> Result<BumpMaps, TextureError> {
        image.validate()?;
        options.validate().into_result()?;

        let strength = options.effective_strength();
        if strength != options.strength {
            warn!(
                requested = options.strength,
                applied = strength,
                "strength clamped"
            );
        }

        let start = Instant::now();
        check_cancel(cancel, "height")?;
        let height = self.generate_height(
            image,
            options.sigma1,
            options.sigma2,
            options.threshold,
            options.height_scale,
        )?;

        check_cancel(cancel, "gradient")?;
        let gradients = self.compute_gradient(&height, options.gradient_method, strength)?;

        check_cancel(cancel, "normal")?;
        let normal = self.synthesize(&gradients)?;

        debug!(
            width = image.width,
            height = image.height,
            method = options.gradient_method.as_str(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "bump maps generated"
        );

        Ok(BumpMaps { height, normal })
    }
}

fn check_cancel(cancel: &AtomicBool, stage: &'static str) -> Result<(), TextureError> {
    if cancel.load(Ordering::Relaxed) {
        debug!(stage, "generation cancelled");
        return Err(TextureError::Cancelled(stage));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Rgba;

    fn checker(size: u32) -> PixelBuffer {
        PixelBuffer::from_fn(size, size, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgba::gray(20.0)
            } else {
                Rgba::gray(230.0)
            }
        })
    }

    #[test]
    fn test_generate_keeps_dimensions() {
        let image = checker(16);
        let maps = MapGenerator::new()
            .generate(&image, &BumpOptions::default())
            .unwrap();
        assert_eq!(maps.height.dimensions(), (16, 16));
        assert_eq!(maps.normal.dimensions(), (16, 16));
        assert!(maps.normal.data.iter().all(|p| p.a == 255.0));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let image = checker(12);
        let options = BumpOptions {
            gradient_method: GradientMethod::Sobel,
            strength: 4.0,
            ..BumpOptions::default()
        };
        let generator = MapGenerator::new();
        let a = generator.generate(&image, &options).unwrap();
        let b = generator.generate(&image, &options).unwrap();
        assert_eq!(a.height, b.height);
        assert_eq!(a.normal, b.normal);
    }

    #[test]
    fn test_kernels_persist_across_runs() {
        let generator = MapGenerator::new();
        let image = checker(8);
        generator.generate(&image, &BumpOptions::default()).unwrap();
        generator.generate(&image, &BumpOptions::default()).unwrap();
        assert_eq!(generator.kernel_cache().generated_count(), 2);
    }

    #[test]
    fn test_shared_cache_is_used() {
        let cache = Arc::new(KernelCache::new());
        let generator = MapGenerator::with_cache(Arc::clone(&cache));
        generator.blur(&checker(4), 1.0).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_out_of_range_strength_is_clamped() {
        let image = checker(8);
        let generator = MapGenerator::new();
        let clamped = generator
            .generate(
                &image,
                &BumpOptions {
                    strength: 500.0,
                    ..BumpOptions::default()
                },
            )
            .unwrap();
        let max = generator
            .generate(
                &image,
                &BumpOptions {
                    strength: 10.0,
                    ..BumpOptions::default()
                },
            )
            .unwrap();
        assert_eq!(clamped.normal, max.normal);
    }

    #[test]
    fn test_invalid_options_fail_before_work() {
        let generator = MapGenerator::new();
        let err = generator
            .generate(
                &checker(8),
                &BumpOptions {
                    sigma1: -1.0,
                    ..BumpOptions::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, TextureError::InvalidParameter(_)));
        assert!(err.to_string().contains("sigma1"));
        assert!(generator.kernel_cache().is_empty());
    }

    #[test]
    fn test_cancelled_run_returns_no_maps() {
        let cancel = AtomicBool::new(true);
        let generator = MapGenerator::new();
        let err = generator
            .generate_with_cancel(&checker(8), &BumpOptions::default(), &cancel)
            .unwrap_err();
        assert!(matches!(err, TextureError::Cancelled("height")));
        assert!(generator.kernel_cache().is_empty());
    }

    #[test]
    fn test_extreme_sigmas_run_to_completion() {
        let image = PixelBuffer::new(2, 2, Rgba::gray(200.0));
        let generator = MapGenerator::new();

        let blurred = generator.blur(&image, 1e300).unwrap();
        assert_eq!(blurred.to_rgba8(), [200u8, 200, 200, 255].repeat(4));

        let maps = generator
            .generate(
                &checker(8),
                &BumpOptions {
                    sigma1: 1e-200,
                    sigma2: 1e300,
                    ..BumpOptions::default()
                },
            )
            .unwrap();
        assert!(maps.height.data.iter().all(|p| p.r.is_finite()));
        assert!(maps.normal.data.iter().all(|p| p.a == 255.0));
    }

    #[test]
    fn test_negative_threshold_is_accepted() {
        let maps = MapGenerator::new()
            .generate(
                &checker(8),
                &BumpOptions {
                    threshold: -1.0,
                    ..BumpOptions::default()
                },
            )
            .unwrap();
        assert_eq!(maps.height.dimensions(), (8, 8));
    }
}
