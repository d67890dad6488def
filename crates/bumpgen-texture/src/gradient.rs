//! Height gradients via central difference, Sobel, or Prewitt stencils.
//!
//! Samples come from the red channel scaled to [0, 1]. The stencils keep
//! different border rules: central difference substitutes the center sample
//! for a missing neighbor, while Sobel and Prewitt clamp indices.

use bumpgen_spec::validation::common::{validate_finite, validate_resolution};
use bumpgen_spec::GradientMethod;
use rayon::prelude::*;
use tracing::debug;

use crate::border::clamp_index;
use crate::buffer::PixelBuffer;
use crate::error::TextureError;

/// Gradient at one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gradient {
    pub dx: f64,
    pub dy: f64,
}

/// Per-pixel gradients of a height map.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientField {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Gradients (row-major).
    pub data: Vec<Gradient>,
}

impl GradientField {
    /// Check that the field is non-empty and holds exactly `width * height` gradients.
    pub fn validate(&self) -> Result<(), TextureError> {
        validate_resolution(self.width, self.height)
            .map_err(|e| TextureError::InvalidInput(e.message))?;
        check_len(self.data.len(), self.width, self.height)
    }

    /// Get the gradient at the given coordinates.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Gradient {
        self.data[y as usize * self.width as usize + x as usize]
    }
}

/// Compute the gradient field of `height` with the given stencil.
///
/// Both components are multiplied by `strength` as given; option-level
/// clamping happens in the caller.
pub fn compute_gradient(
    height: &PixelBuffer,
    method: GradientMethod,
    strength: f64,
) -> Result<GradientField, TextureError> {
    height.validate()?;
    validate_finite("strength", strength)
        .map_err(|e| TextureError::InvalidParameter(e.message))?;

    let w = height.width as usize;
    let h = height.height as usize;
    let samples: Vec<f64> = height.data.iter().map(|p| p.r / 255.0).collect();
    let grid = Grid {
        samples: &samples,
        w,
        h,
    };

    let mut data = vec![Gradient::default(); w * h];
    data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, out) in row.iter_mut().enumerate() {
            let (dx, dy) = match method {
                GradientMethod::Central => grid.central(x, y),
                GradientMethod::Sobel => grid.sobel(x, y),
                GradientMethod::Prewitt => grid.prewitt(x, y),
            };
            *out = Gradient {
                dx: dx * strength,
                dy: dy * strength,
            };
        }
    });

    debug!(
        width = height.width,
        height = height.height,
        method = method.as_str(),
        strength,
        "gradient field"
    );

    Ok(GradientField {
        width: height.width,
        height: height.height,
        data,
    })
}

/// Fails unless `len` matches a `width x height` grid.
pub(crate) fn check_len(len: usize, width: u32, height: u32) -> Result<(), TextureError> {
    if len != width as usize * height as usize {
        return Err(TextureError::InvalidInput(format!(
            "field holds {} entries but is declared {}x{}",
            len, width, height
        )));
    }
    Ok(())
}

struct Grid<'a> {
    samples: &'a [f64],
    w: usize,
    h: usize,
}

impl Grid<'_> {
    #[inline]
    fn at(&self, x: usize, y: usize) -> f64 {
        self.samples[y * self.w + x]
    }

    #[inline]
    fn clamped(&self, x: isize, y: isize) -> f64 {
        self.at(clamp_index(x, self.w), clamp_index(y, self.h))
    }

    fn central(&self, x: usize, y: usize) -> (f64, f64) {
        let center = self.at(x, y);
        let left = if x > 0 { self.at(x - 1, y) } else { center };
        let right = if x + 1 < self.w { self.at(x + 1, y) } else { center };
        let top = if y > 0 { self.at(x, y - 1) } else { center };
        let bottom = if y + 1 < self.h { self.at(x, y + 1) } else { center };

        ((right - left) / 2.0, (bottom - top) / 2.0)
    }

    /// 3x3 neighborhood with clamped indices, `n[row][col]`.
    fn neighborhood(&self, x: usize, y: usize) -> [[f64; 3]; 3] {
        let (x, y) = (x as isize, y as isize);
        let mut n = [[0.0; 3]; 3];
        for (dy, row) in n.iter_mut().enumerate() {
            for (dx, v) in row.iter_mut().enumerate() {
                *v = self.clamped(x + dx as isize - 1, y + dy as isize - 1);
            }
        }
        n
    }

    // Gx = | -1  0  1 |    Gy = | -1 -2 -1 |
    //      | -2  0  2 |         |  0  0  0 |
    //      | -1  0  1 |         |  1  2  1 |
    fn sobel(&self, x: usize, y: usize) -> (f64, f64) {
        let n = self.neighborhood(x, y);
        let dx = (-n[0][0] + n[0][2] - 2.0 * n[1][0] + 2.0 * n[1][2] - n[2][0] + n[2][2]) / 8.0;
        let dy = (-n[0][0] - 2.0 * n[0][1] - n[0][2] + n[2][0] + 2.0 * n[2][1] + n[2][2]) / 8.0;
        (dx, dy)
    }

    fn prewitt(&self, x: usize, y: usize) -> (f64, f64) {
        let n = self.neighborhood(x, y);
        let dx = (-n[0][0] + n[0][2] - n[1][0] + n[1][2] - n[2][0] + n[2][2]) / 6.0;
        let dy = (-n[0][0] - n[0][1] - n[0][2] + n[2][0] + n[2][1] + n[2][2]) / 6.0;
        (dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Rgba;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn ramp() -> PixelBuffer {
        let values = [0.0, 64.0, 128.0, 192.0, 255.0];
        PixelBuffer::from_fn(5, 3, |x, _| Rgba::gray(values[x as usize]))
    }

    #[test]
    fn test_central_ramp_interior_and_borders() {
        let field = compute_gradient(&ramp(), GradientMethod::Central, 1.0).unwrap();

        assert!(approx_eq(field.get(2, 1).dx, (192.0 - 64.0) / 255.0 / 2.0));
        // Left border: missing left neighbor replaced by the center (0).
        assert!(approx_eq(field.get(0, 1).dx, (64.0 / 255.0) / 2.0));
        // Right border: missing right neighbor replaced by the center (255).
        assert!(approx_eq(field.get(4, 1).dx, (255.0 - 192.0) / 255.0 / 2.0));
        assert!(field.data.iter().all(|g| g.dy == 0.0));
    }

    #[test]
    fn test_sobel_ramp_uses_clamped_border() {
        let field = compute_gradient(&ramp(), GradientMethod::Sobel, 1.0).unwrap();

        // Interior: each row contributes (192 - 64), weights 1 + 2 + 1 over 8.
        assert!(approx_eq(field.get(2, 1).dx, 4.0 * (128.0 / 255.0) / 8.0));
        // x = 0 clamps the left column onto itself: (64 - 0) per row.
        assert!(approx_eq(field.get(0, 1).dx, 4.0 * (64.0 / 255.0) / 8.0));
        assert!(field.data.iter().all(|g| approx_eq(g.dy, 0.0)));
    }

    #[test]
    fn test_prewitt_uses_unit_weights() {
        let field = compute_gradient(&ramp(), GradientMethod::Prewitt, 1.0).unwrap();
        assert!(approx_eq(field.get(2, 1).dx, 3.0 * (128.0 / 255.0) / 6.0));
        assert!(approx_eq(field.get(4, 0).dx, 3.0 * (63.0 / 255.0) / 6.0));
    }

    #[test]
    fn test_stencils_differ_at_corners() {
        let mut image = PixelBuffer::new(3, 3, Rgba::gray(0.0));
        image.set(0, 0, Rgba::gray(255.0));

        let central = compute_gradient(&image, GradientMethod::Central, 1.0).unwrap();
        let sobel = compute_gradient(&image, GradientMethod::Sobel, 1.0).unwrap();
        let prewitt = compute_gradient(&image, GradientMethod::Prewitt, 1.0).unwrap();

        assert!(approx_eq(central.get(0, 0).dx, -0.5));
        assert!(approx_eq(sobel.get(0, 0).dx, -3.0 / 8.0));
        assert!(approx_eq(prewitt.get(0, 0).dx, -2.0 / 6.0));
    }

    #[test]
    fn test_vertical_ramp_gives_dy() {
        let image = PixelBuffer::from_fn(3, 4, |_, y| Rgba::gray(y as f64 * 51.0));
        for method in GradientMethod::ALL {
            let field = compute_gradient(&image, method, 1.0).unwrap();
            let g = field.get(1, 1);
            assert!(approx_eq(g.dx, 0.0), "{} dx {}", method, g.dx);
            assert!(approx_eq(g.dy, 51.0 / 255.0), "{} dy {}", method, g.dy);
        }
    }

    #[test]
    fn test_strength_scales_both_components() {
        let image = PixelBuffer::from_fn(4, 4, |x, y| Rgba::gray((x * 20 + y * 10) as f64));
        let base = compute_gradient(&image, GradientMethod::Sobel, 1.0).unwrap();
        let scaled = compute_gradient(&image, GradientMethod::Sobel, 2.5).unwrap();
        for (a, b) in base.data.iter().zip(&scaled.data) {
            assert!(approx_eq(a.dx * 2.5, b.dx));
            assert!(approx_eq(a.dy * 2.5, b.dy));
        }
    }

    #[test]
    fn test_single_pixel_has_zero_gradient() {
        let image = PixelBuffer::new(1, 1, Rgba::gray(90.0));
        for method in GradientMethod::ALL {
            let field = compute_gradient(&image, method, 3.0).unwrap();
            assert_eq!(field.data, vec![Gradient::default()]);
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        let empty = PixelBuffer::new(3, 0, Rgba::gray(0.0));
        assert!(matches!(
            compute_gradient(&empty, GradientMethod::Central, 1.0),
            Err(TextureError::InvalidInput(_))
        ));

        let image = PixelBuffer::new(2, 2, Rgba::gray(0.0));
        assert!(matches!(
            compute_gradient(&image, GradientMethod::Central, f64::NAN),
            Err(TextureError::InvalidParameter(_))
        ));
    }
}
