//! Floyd-Steinberg error diffusion over the six-color palette.
//!
//! The arena holds one float triple per pixel for the whole image, seeded
//! with tone-adjusted values. Diffused error is added into the arena without
//! clamping so that overshoot is carried forward; only the values written
//! back into the buffer are rounded and clamped.

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::palette::nearest_rgb;
use crate::tone::ToneGain;

use super::{Kernel, Quantize, FLOYD_STEINBERG};

/// Floyd-Steinberg error diffusion.
///
/// Row-major, left-to-right on every row (no serpentine). The scan is
/// strictly sequential: each pixel depends on error diffused from pixels
/// already visited.
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub struct FloydSteinberg;

impl Quantize for FloydSteinberg {
    fn quantize(&self, buffer: &mut PixelBuffer, gain: &ToneGain) {
        diffuse(buffer, gain, &FLOYD_STEINBERG);
    }
}

/// Full-image float buffer for accumulated error.
struct ErrorArena {
    width: usize,
    height: usize,
    values: Vec<[f32; 3]>,
}

impl ErrorArena {
    fn seeded(buffer: &PixelBuffer, gain: &ToneGain) -> Self {
        Self {
            width: buffer.width(),
            height: buffer.height(),
            values: buffer.pixels().iter().map(|&c| gain.adjust(c)).collect(),
        }
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> [f32; 3] {
        self.values[y * self.width + x]
    }

    /// Add `error * scale` to `(x + dx, y + dy)` if it lies inside the image.
    #[inline]
    fn spread(&mut self, x: usize, y: usize, dx: i32, dy: i32, error: [f32; 3], scale: f32) {
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
            return;
        }
        let slot = &mut self.values[ny as usize * self.width + nx as usize];
        for (channel, err) in slot.iter_mut().zip(error) {
            *channel += err * scale;
        }
    }
}

fn diffuse(buffer: &mut PixelBuffer, gain: &ToneGain, kernel: &Kernel) {
    let (width, height) = (buffer.width(), buffer.height());
    let mut arena = ErrorArena::seeded(buffer, gain);
    let divisor = kernel.divisor as f32;

    for y in 0..height {
        for x in 0..width {
            let old = arena.get(x, y);
            let chosen = nearest_rgb(old).color.to_f32();
            let error = [old[0] - chosen[0], old[1] - chosen[1], old[2] - chosen[2]];

            for &(dx, dy, weight) in kernel.entries {
                arena.spread(x, y, dx, dy, error, weight as f32 / divisor);
            }

            let alpha = buffer.get(x, y).a;
            buffer.set(x, y, Color::from_f32_clamped(chosen, alpha));
        }
    }
}
