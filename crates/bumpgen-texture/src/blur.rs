//! Separable Gaussian blur with mirrored borders.
//!
//! The 2D blur runs as a horizontal pass followed by a vertical pass over
//! the horizontal result, each O(W * H * size). Rows are processed in
//! parallel; the vertical pass only starts once the horizontal buffer is
//! complete.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use crate::border::mirror_index;
use crate::buffer::{PixelBuffer, Rgba};
use crate::error::TextureError;
use crate::kernel::{Kernel, KernelCache, WEIGHT_EPSILON};

/// Gaussian blur backed by a shared kernel cache.
#[derive(Debug, Clone, Default)]
pub struct SeparableBlur {
    cache: Arc<KernelCache>,
}

impl SeparableBlur {
    /// Create a blur that memoizes kernels in `cache`.
    pub fn new(cache: Arc<KernelCache>) -> Self {
        Self { cache }
    }

    /// The kernel cache used by this blur.
    pub fn cache(&self) -> &Arc<KernelCache> {
        &self.cache
    }

    /// The kernel [`blur`](Self::blur) applies to `image` at `sigma`.
    ///
    /// Huge sigmas get a kernel no wider than a mirrored sample can reach.
    pub fn kernel_for(&self, image: &PixelBuffer, sigma: f64) -> Result<Arc<Kernel>, TextureError> {
        let extent = image.width.max(image.height) as usize;
        self.cache.kernel_for_extent(sigma, extent)
    }

    /// Blur R, G and B at `sigma`; alpha is carried through unchanged.
    ///
    /// The output has the input's dimensions and channels clamped to [0, 255].
    pub fn blur(&self, image: &PixelBuffer, sigma: f64) -> Result<PixelBuffer, TextureError> {
        image.validate()?;
        let kernel = self.kernel_for(image, sigma)?;

        let start = Instant::now();
        let horizontal = horizontal_pass(image, &kernel);
        let data = vertical_pass(&horizontal, image.width as usize, image.height as usize, &kernel);

        debug!(
            width = image.width,
            height = image.height,
            sigma,
            size = kernel.size(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "separable blur"
        );

        Ok(PixelBuffer {
            width: image.width,
            height: image.height,
            data,
        })
    }
}

/// Weighted mean of R, G, B around `center` along one axis of length `len`.
///
/// Taps that fall outside the axis after mirroring are skipped and the sum
/// is divided by the weights actually used; a used weight below
/// [`WEIGHT_EPSILON`] gives zero.
#[inline]
fn weighted_rgb(
    kernel: &Kernel,
    center: usize,
    len: usize,
    sample: impl Fn(usize) -> Rgba,
) -> [f64; 3] {
    let half = kernel.half_width() as isize;
    let mut acc = [0.0; 3];
    let mut used = 0.0;

    for (tap, &weight) in kernel.weights.iter().enumerate() {
        let offset = tap as isize - half;
        let Some(idx) = mirror_index(center as isize + offset, len) else {
            continue;
        };
        let p = sample(idx);
        acc[0] += weight * p.r;
        acc[1] += weight * p.g;
        acc[2] += weight * p.b;
        used += weight;
    }

    if used < WEIGHT_EPSILON {
        return [0.0; 3];
    }
    acc.map(|c| c / used)
}

fn horizontal_pass(image: &PixelBuffer, kernel: &Kernel) -> Vec<Rgba> {
    let w = image.width as usize;
    let mut out = vec![Rgba::gray(0.0); image.data.len()];

    out.par_chunks_mut(w).enumerate().for_each(|(y, row_out)| {
        let row = &image.data[y * w..(y + 1) * w];
        for (x, px) in row_out.iter_mut().enumerate() {
            let [r, g, b] = weighted_rgb(kernel, x, w, |i| row[i]);
            *px = Rgba::new(r, g, b, row[x].a);
        }
    });

    out
}

fn vertical_pass(src: &[Rgba], w: usize, h: usize, kernel: &Kernel) -> Vec<Rgba> {
    let mut out = vec![Rgba::gray(0.0); src.len()];

    out.par_chunks_mut(w).enumerate().for_each(|(y, row_out)| {
        for (x, px) in row_out.iter_mut().enumerate() {
            let [r, g, b] = weighted_rgb(kernel, y, h, |i| src[i * w + x]);
            *px = Rgba::new(r, g, b, src[y * w + x].a).clamp();
        }
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn blur() -> SeparableBlur {
        SeparableBlur::new(Arc::new(KernelCache::new()))
    }

    #[test]
    fn test_constant_image_is_unchanged() {
        let image = PixelBuffer::new(9, 5, Rgba::new(12.0, 99.0, 230.0, 77.0));
        for sigma in [0.3, 1.0, 2.5, 6.0] {
            let out = blur().blur(&image, sigma).unwrap();
            assert_eq!(out.dimensions(), (9, 5));
            for p in &out.data {
                assert!(approx_eq(p.r, 12.0), "sigma {} r {}", sigma, p.r);
                assert!(approx_eq(p.g, 99.0));
                assert!(approx_eq(p.b, 230.0));
                assert_eq!(p.a, 77.0);
            }
        }
    }

    #[test]
    fn test_single_pixel_collapses_to_itself() {
        let image = PixelBuffer::new(1, 1, Rgba::gray(200.0));
        for sigma in [0.5, 1.0, 4.0, 20.0] {
            let out = blur().blur(&image, sigma).unwrap();
            assert_eq!(out.to_rgba8(), vec![200, 200, 200, 255]);
            assert!(approx_eq(out.data[0].r, 200.0));
        }
    }

    #[test]
    fn test_alpha_is_preserved_per_pixel() {
        let image = PixelBuffer::from_fn(4, 4, |x, y| {
            Rgba::new((x * 60) as f64, 0.0, 0.0, (y * 80) as f64)
        });
        let out = blur().blur(&image, 1.0).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out.get(x, y).a, (y * 80) as f64);
            }
        }
    }

    #[test]
    fn test_impulse_spreads_symmetrically() {
        let mut image = PixelBuffer::new(9, 9, Rgba::gray(0.0));
        image.set(4, 4, Rgba::gray(255.0));
        let out = blur().blur(&image, 1.0).unwrap();

        let center = out.get(4, 4).r;
        assert!(center < 255.0 && center > 0.0);
        assert!(approx_eq(out.get(3, 4).r, out.get(5, 4).r));
        assert!(approx_eq(out.get(4, 3).r, out.get(4, 5).r));
        assert!(approx_eq(out.get(3, 4).r, out.get(4, 3).r));
        assert!(out.get(3, 4).r < center);
    }

    #[test]
    fn test_channels_blur_independently() {
        let image = PixelBuffer::from_fn(6, 1, |x, _| {
            if x < 3 {
                Rgba::opaque(255.0, 0.0, 40.0)
            } else {
                Rgba::opaque(0.0, 255.0, 40.0)
            }
        });
        let out = blur().blur(&image, 1.0).unwrap();
        for p in &out.data {
            assert!(approx_eq(p.r + p.g, 255.0));
            assert!(approx_eq(p.b, 40.0));
        }
    }

    #[test]
    fn test_mirror_border_reflects_interior_samples() {
        // Row [0, 100, 0]: mirroring at x=0 reads index 1 on both sides.
        let image = PixelBuffer::from_fn(3, 1, |x, _| Rgba::gray(if x == 1 { 100.0 } else { 0.0 }));
        let out = blur().blur(&image, 0.5).unwrap();
        let k = Kernel::gaussian(0.5, 3).unwrap();
        let expected_edge = 2.0 * k.weights[0] * 100.0;
        assert!(approx_eq(out.get(0, 0).r, expected_edge));
        assert!(approx_eq(out.get(2, 0).r, expected_edge));
    }

    #[test]
    fn test_huge_sigma_averages_reachable_samples() {
        let image = PixelBuffer::new(2, 2, Rgba::gray(200.0));
        let out = blur().blur(&image, 1e300).unwrap();
        assert_eq!(out.to_rgba8(), [200u8, 200, 200, 255].repeat(4));

        // Every tap is equal, so a 3-wide row collapses towards its mean.
        let row = PixelBuffer::from_fn(3, 1, |x, _| Rgba::gray((x * 90) as f64));
        let wide = blur().blur(&row, 1e300).unwrap();
        let capped = blur().blur(&row, 1e9).unwrap();
        for (a, b) in wide.data.iter().zip(&capped.data) {
            assert!(approx_eq(a.r, b.r), "{} vs {}", a.r, b.r);
        }
        assert!(wide.data.iter().all(|p| p.r.is_finite()));
    }

    #[test]
    fn test_underflowing_sigma_is_identity() {
        let image = PixelBuffer::from_fn(3, 3, |x, y| Rgba::gray((x * 50 + y * 20) as f64));
        let out = blur().blur(&image, 1e-200).unwrap();
        for (p, src) in out.data.iter().zip(&image.data) {
            assert!(!p.r.is_nan());
            assert_eq!(p.r, src.r);
        }
    }

    #[test]
    fn test_reuses_cached_kernel() {
        let blur = blur();
        let image = PixelBuffer::new(4, 4, Rgba::gray(10.0));
        blur.blur(&image, 2.0).unwrap();
        blur.blur(&image, 2.0).unwrap();
        assert_eq!(blur.cache().generated_count(), 1);
    }

    #[test]
    fn test_rejects_bad_input() {
        let image = PixelBuffer::new(0, 4, Rgba::gray(10.0));
        assert!(matches!(
            blur().blur(&image, 1.0),
            Err(TextureError::InvalidInput(_))
        ));

        let image = PixelBuffer::new(2, 2, Rgba::gray(10.0));
        assert!(matches!(
            blur().blur(&image, 0.0),
            Err(TextureError::InvalidParameter(_))
        ));
        assert!(matches!(
            blur().blur(&image, -3.0),
            Err(TextureError::InvalidParameter(_))
        ));
    }
}
