//! RGBA pixel buffers exchanged between pipeline stages.
//!
//! Channels are `f64` on the 8-bit scale [0, 255], so intermediate results
//! keep full precision until a caller asks for bytes.

use bumpgen_spec::validation::common::validate_resolution;

use crate::error::TextureError;

/// Fully opaque alpha.
pub const OPAQUE: f64 = 255.0;

/// Neutral gray used for "no height".
pub const NEUTRAL: f64 = 128.0;

/// RGBA pixel with channels on the [0, 255] scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    /// Create a pixel from all four channels.
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque pixel.
    pub const fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, OPAQUE)
    }

    /// Create an opaque gray pixel.
    pub const fn gray(value: f64) -> Self {
        Self::opaque(value, value, value)
    }

    /// Create a pixel from 8-bit channels.
    pub fn from_rgba8(bytes: [u8; 4]) -> Self {
        Self::new(
            bytes[0] as f64,
            bytes[1] as f64,
            bytes[2] as f64,
            bytes[3] as f64,
        )
    }

    /// Clamp all channels to [0, 255].
    pub fn clamp(&self) -> Rgba {
        Rgba {
            r: self.r.clamp(0.0, 255.0),
            g: self.g.clamp(0.0, 255.0),
            b: self.b.clamp(0.0, 255.0),
            a: self.a.clamp(0.0, 255.0),
        }
    }

    /// Convert to 8-bit RGBA, clamping and rounding each channel.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let c = self.clamp();
        [
            c.r.round() as u8,
            c.g.round() as u8,
            c.b.round() as u8,
            c.a.round() as u8,
        ]
    }

    /// Mean of the three color channels.
    #[inline]
    pub fn mean_rgb(&self) -> f64 {
        (self.r + self.g + self.b) / 3.0
    }
}

/// A 2D RGBA image buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data (row-major).
    pub data: Vec<Rgba>,
}

impl PixelBuffer {
    /// Create a new buffer filled with a pixel value.
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            data: vec![fill; size],
        }
    }

    /// Create a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Create a buffer from tightly packed RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, TextureError> {
        validate_resolution(width, height)
            .map_err(|e| TextureError::InvalidInput(e.message))?;

        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(TextureError::InvalidInput(format!(
                "expected {} bytes for {}x{} RGBA8, got {}",
                expected,
                width,
                height,
                bytes.len()
            )));
        }

        let data = bytes
            .chunks_exact(4)
            .map(|px| Rgba::from_rgba8([px[0], px[1], px[2], px[3]]))
            .collect();

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Check that the buffer is non-empty and its data matches its dimensions.
    pub fn validate(&self) -> Result<(), TextureError> {
        validate_resolution(self.width, self.height)
            .map_err(|e| TextureError::InvalidInput(e.message))?;

        let expected = self.width as usize * self.height as usize;
        if self.data.len() != expected {
            return Err(TextureError::InvalidInput(format!(
                "buffer holds {} pixels but is declared {}x{}",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Width and height as a pair.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get a pixel at the given coordinates.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        let idx = y as usize * self.width as usize + x as usize;
        self.data[idx]
    }

    /// Set a pixel at the given coordinates.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, pixel: Rgba) {
        let idx = y as usize * self.width as usize + x as usize;
        self.data[idx] = pixel;
    }

    /// Borrow one row of pixels.
    #[inline]
    pub fn row(&self, y: u32) -> &[Rgba] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.data[start..start + w]
    }

    /// Convert to 8-bit RGBA bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 4);
        for pixel in &self.data {
            bytes.extend_from_slice(&pixel.to_rgba8());
        }
        bytes
    }

    /// Convert to 8-bit RGB bytes, dropping alpha.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 3);
        for pixel in &self.data {
            let rgba = pixel.to_rgba8();
            bytes.extend_from_slice(&rgba[..3]);
        }
        bytes
    }
}
