//! Circular mask for round panels.
//!
//! The disk is centred on `((w - 1) / 2, (h - 1) / 2)` with radius `w / 2`.
//! Pixels strictly outside it are forced to white so the panel's uncovered
//! corners stay blank. Alpha is left as it was.

use crate::buffer::PixelBuffer;
use crate::color::Color;

/// Whether `(x, y)` lies strictly outside the disk inscribed in a
/// `width` x `height` buffer.
pub fn is_outside_disk(x: usize, y: usize, width: usize, height: usize) -> bool {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let radius = width as f64 / 2.0;
    let dx = x as f64 - cx;
    let dy = y as f64 - cy;
    dx * dx + dy * dy > radius * radius
}

/// Whiten every pixel outside the disk. Returns the number of pixels
/// touched.
pub fn apply_circular_mask(buffer: &mut PixelBuffer) -> usize {
    let (width, height) = (buffer.width(), buffer.height());
    let mut masked = 0;
    for y in 0..height {
        for x in 0..width {
            if is_outside_disk(x, y, width, height) {
                let pixel = buffer.get(x, y);
                buffer.set(x, y, pixel.with_rgb(Color::WHITE));
                masked += 1;
            }
        }
    }
    tracing::debug!(masked, width, height, "applied circular mask");
    masked
}
