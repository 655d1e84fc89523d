//! Per-pixel nearest-color quantization.

use crate::buffer::PixelBuffer;
use crate::palette::nearest_rgb;
use crate::tone::ToneGain;

use super::Quantize;

/// Replaces every pixel with its nearest palette color, independently.
///
/// Alpha is left untouched. Running it twice gives the same buffer as
/// running it once, provided the gain is identity.
pub struct Flat;

impl Quantize for Flat {
    fn quantize(&self, buffer: &mut PixelBuffer, gain: &ToneGain) {
        for pixel in buffer.pixels_mut() {
            let entry = nearest_rgb(gain.adjust(*pixel));
            *pixel = pixel.with_rgb(entry.color);
        }
    }
}
