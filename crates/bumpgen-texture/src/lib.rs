//! bumpgen Texture Backend
//!
//! This crate derives a height (bump) map and a tangent-space normal map from
//! a single source image. Every stage is a deterministic function of its
//! input: the same image and options always produce the same maps.
//!
//! # Pipeline
//!
//! - **Kernels**: normalized 1D Gaussians, memoized per `(sigma, size)`
//! - **Blur**: separable two-pass convolution with mirrored borders
//! - **Height**: Difference-of-Gaussians with a threshold/neutral policy
//! - **Gradient**: central difference, Sobel, or Prewitt stencils
//! - **Normal**: lift, normalize, and encode into RGB
//!
//! # Example
//!
//! ```
//! use bumpgen_texture::{MapGenerator, PixelBuffer, Rgba};
//! use bumpgen_spec::{BumpOptions, GradientMethod};
//!
//! let image = PixelBuffer::from_fn(32, 32, |x, y| {
//!     Rgba::gray(if (x / 8 + y / 8) % 2 == 0 { 40.0 } else { 220.0 })
//! });
//!
//! let options = BumpOptions {
//!     gradient_method: GradientMethod::Sobel,
//!     ..BumpOptions::default()
//! };
//!
//! let maps = MapGenerator::new().generate(&image, &options).unwrap();
//! assert_eq!(maps.height.dimensions(), (32, 32));
//! assert_eq!(maps.normal.dimensions(), (32, 32));
//! ```
//!
//! # Concurrency
//!
//! Stages are parallelized by row with rayon. Each stage completes before
//! the next one starts. The kernel cache is the only shared mutable state
//! and is guarded by a mutex.

pub mod blur;
pub mod border;
pub mod buffer;
pub mod error;
pub mod gradient;
pub mod height;
pub mod kernel;
pub mod normal;
pub mod pipeline;

// Re-export main types for convenience
pub use blur::SeparableBlur;
pub use buffer::{PixelBuffer, Rgba, NEUTRAL, OPAQUE};
pub use error::TextureError;
pub use gradient::{compute_gradient, Gradient, GradientField};
pub use height::{height_from_dog, DogHeightExtractor};
pub use kernel::{kernel_size_for_extent, kernel_size_for_sigma, Kernel, KernelCache};
pub use normal::{NormalSynthesizer, VectorField};
pub use pipeline::{BumpMaps, MapGenerator};
