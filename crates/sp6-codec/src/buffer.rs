//! Row-major pixel buffer handed to the codec.

use crate::color::Color;
use crate::error::CodecError;

/// A `width` x `height` grid of [`Color`], row-major, top-left origin.
///
/// The codec owns the buffer for the duration of one conversion and
/// quantizes it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Wrap existing pixels.
    ///
    /// # Errors
    ///
    /// [`CodecError::BufferLength`] if `pixels.len() != width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<Color>) -> Result<Self, CodecError> {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(CodecError::BufferLength {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A buffer filled with a single color.
    pub fn filled(width: usize, height: usize, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Build from interleaved RGBA bytes, as produced by canvas or image
    /// decoders.
    ///
    /// # Errors
    ///
    /// [`CodecError::BufferLength`] if `rgba.len() != width * height * 4`.
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> Result<Self, CodecError> {
        let expected = width * height * 4;
        if rgba.len() != expected {
            return Err(CodecError::BufferLength {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        let pixels = rgba
            .chunks_exact(4)
            .map(|px| Color::rgba(px[0], px[1], px[2], px[3]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Interleaved RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| [c.r, c.g, c.b, c.a])
            .collect()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        self.pixels[y * self.width + x] = color;
    }
}
