//! Palette quantization.
//!
//! Two strategies share the [`Quantize`] trait:
//!
//! - [`Flat`]: every pixel maps to its nearest palette color on its own.
//! - [`FloydSteinberg`]: error diffusion with the classic 7/3/5/1 kernel.
//!
//! Both apply the [`ToneGain`] first and leave alpha alone. Neither can fail.

mod flat;
mod floyd_steinberg;
mod kernel;

pub use flat::Flat;
pub use floyd_steinberg::FloydSteinberg;
pub use kernel::{Kernel, FLOYD_STEINBERG};

use crate::buffer::PixelBuffer;
use crate::tone::ToneGain;

/// Replaces every pixel of a buffer with a palette color, in place.
pub trait Quantize {
    fn quantize(&self, buffer: &mut PixelBuffer, gain: &ToneGain);
}

/// Quantizer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantizer {
    #[default]
    Flat,
    FloydSteinberg,
}

impl Quantizer {
    /// `true` selects error diffusion.
    pub fn from_dither_flag(dither: bool) -> Self {
        if dither {
            Self::FloydSteinberg
        } else {
            Self::Flat
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::FloydSteinberg => "floyd-steinberg",
        }
    }
}

impl Quantize for Quantizer {
    fn quantize(&self, buffer: &mut PixelBuffer, gain: &ToneGain) {
        match self {
            Self::Flat => Flat.quantize(buffer, gain),
            Self::FloydSteinberg => FloydSteinberg.quantize(buffer, gain),
        }
    }
}
