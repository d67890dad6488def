//! Normalized 1D Gaussian kernels and their cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace};

use crate::error::TextureError;

/// Weight sums below this are treated as degenerate.
pub const WEIGHT_EPSILON: f64 = 1e-5;

/// Kernel size for a blur sigma: `max(3, ceil(6 * sigma))`, rounded up to odd.
///
/// Saturates at `usize::MAX` for huge sigmas; see [`kernel_size_for_extent`].
pub fn kernel_size_for_sigma(sigma: f64) -> usize {
    let size = ((6.0 * sigma).ceil() as usize).max(3);
    if size % 2 == 0 {
        size.saturating_add(1)
    } else {
        size
    }
}

/// Kernel size for a blur at `sigma` over an axis of at most `extent` pixels.
///
/// A single mirror reflection reaches at most `2 * (extent - 1)` pixels from
/// the center, so taps beyond that are always skipped. Capping the size at
/// `4 * extent - 3` drops only those taps and leaves the blur unchanged.
pub fn kernel_size_for_extent(sigma: f64, extent: usize) -> usize {
    let reachable = extent.max(1).saturating_mul(4).saturating_sub(3);
    kernel_size_for_sigma(sigma).min(reachable)
}

/// A normalized 1D Gaussian kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    pub sigma: f64,
    pub weights: Vec<f64>,
}

impl Kernel {
    /// Build a kernel of `size` taps centered on `size / 2`.
    ///
    /// Weights are divided by their sum; if the sum is below
    /// [`WEIGHT_EPSILON`] every tap is `1 / size` instead.
    pub fn gaussian(sigma: f64, size: usize) -> Result<Self, TextureError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(TextureError::InvalidParameter(format!(
                "sigma must be positive and finite, got {}",
                sigma
            )));
        }
        if size < 1 {
            return Err(TextureError::InvalidParameter(format!(
                "kernel size must be at least 1, got {}",
                size
            )));
        }

        let mut weights = Vec::new();
        weights.try_reserve_exact(size).map_err(|_| {
            TextureError::InvalidParameter(format!("kernel size {} is too large", size))
        })?;

        let half = (size / 2) as f64;
        let two_sigma_sq = 2.0 * sigma * sigma;
        weights.extend((0..size).map(|i| {
            let x = i as f64 - half;
            // 2 * sigma^2 underflows to zero for sigma below ~1e-162.
            if x == 0.0 {
                1.0
            } else {
                (-x * x / two_sigma_sq).exp()
            }
        }));

        let sum: f64 = weights.iter().sum();
        if !(sum >= WEIGHT_EPSILON) {
            let uniform = 1.0 / size as f64;
            weights.iter_mut().for_each(|w| *w = uniform);
        } else {
            weights.iter_mut().for_each(|w| *w /= sum);
        }

        Ok(Self { sigma, weights })
    }

    /// Number of taps.
    pub fn size(&self) -> usize {
        self.weights.len()
    }

    /// Offset of the center tap.
    pub fn half_width(&self) -> usize {
        self.weights.len() / 2
    }
}

/// Cache key: the exact sigma bit pattern plus the tap count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KernelKey {
    sigma_bits: u64,
    size: usize,
}

impl KernelKey {
    fn new(sigma: f64, size: usize) -> Self {
        // +0.0 and -0.0 never reach here; sigma is validated positive.
        Self {
            sigma_bits: sigma.to_bits(),
            size,
        }
    }
}

/// Thread-safe memo of Gaussian kernels keyed by `(sigma, size)`.
///
/// Lookups and inserts happen under one lock, so concurrent first requests
/// for the same key share a single kernel instance.
#[derive(Debug, Default)]
pub struct KernelCache {
    kernels: Mutex<HashMap<KernelKey, Arc<Kernel>>>,
    generated: AtomicUsize,
}

impl KernelCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the kernel for `(sigma, size)`, building it on first use.
    pub fn get_kernel(&self, sigma: f64, size: usize) -> Result<Arc<Kernel>, TextureError> {
        let key = KernelKey::new(sigma, size);
        let mut kernels = self.lock();

        if let Some(kernel) = kernels.get(&key) {
            trace!(sigma, size, "kernel cache hit");
            return Ok(Arc::clone(kernel));
        }

        let kernel = Arc::new(Kernel::gaussian(sigma, size)?);
        self.generated.fetch_add(1, Ordering::Relaxed);
        debug!(sigma, size, cached = kernels.len() + 1, "kernel cache miss");
        kernels.insert(key, Arc::clone(&kernel));
        Ok(kernel)
    }

    /// Return the kernel a blur at `sigma` uses on an image whose longest
    /// side is `extent` pixels.
    pub fn kernel_for_extent(&self, sigma: f64, extent: usize) -> Result<Arc<Kernel>, TextureError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(TextureError::InvalidParameter(format!(
                "sigma must be positive and finite, got {}",
                sigma
            )));
        }
        self.get_kernel(sigma, kernel_size_for_extent(sigma, extent))
    }

    /// Number of cached kernels.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of kernels built since the cache was created.
    pub fn generated_count(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }

    /// Drop every cached kernel.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<KernelKey, Arc<Kernel>>> {
        // The map only ever holds complete kernels, so a poisoned lock is still consistent.
        self.kernels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
