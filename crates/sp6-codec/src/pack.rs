//! The sp6 bitstream: two 4-bit palette codes per byte.
//!
//! # Scan order
//!
//! The panel is mounted upside down relative to its controller's scan, so
//! the stream is produced in *output* coordinates: rows bottom to top,
//! columns right to left. Each output position `(ox, oy)` reads the source
//! pixel given by the [`PanelRotation`].
//!
//! # Nibble placement
//!
//! Within each consecutive pair of scanned codes the first lands in the low
//! nibble and the second in the high nibble. For even widths this puts the
//! even output column of every column pair in the high nibble. When the
//! pixel count is odd the final code sits alone in the high nibble of the
//! last byte with a zero low nibble.
//!
//! The firmware's own `set_pixel` computes byte offsets shifted by one
//! nibble against this layout, so how the device reads a lone trailing
//! nibble is still unsettled.
//!
//! ```text
//! 2x2, red at top-left, inverted panel:
//!   scan (1,1)->src(0,0)=3, (0,1)->src(1,0)=1   byte 0x13
//!   scan (1,0)->src(0,1)=1, (0,0)->src(1,1)=1   byte 0x11
//! ```

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::error::CodecError;
use crate::palette::{by_code, nearest};

/// Mounting of the panel relative to the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelRotation {
    /// Source pixel `(x, y)` shows at output `(x, y)`.
    Upright,
    /// Source pixel `(x, y)` shows at output `(w - 1 - x, h - 1 - y)`.
    #[default]
    Inverted,
}

impl PanelRotation {
    /// Normalise `degrees` into `[0, 360)`. Only 180 inverts; every other
    /// angle is treated as upright.
    pub fn from_degrees(degrees: i32) -> Self {
        if degrees.rem_euclid(360) == 180 {
            Self::Inverted
        } else {
            Self::Upright
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Self::Upright => 0,
            Self::Inverted => 180,
        }
    }

    /// Source coordinates for output position `(ox, oy)`.
    #[inline]
    pub fn source(&self, ox: usize, oy: usize, width: usize, height: usize) -> (usize, usize) {
        match self {
            Self::Upright => (ox, oy),
            Self::Inverted => (width - 1 - ox, height - 1 - oy),
        }
    }
}

/// Length of the packed stream for a `width` x `height` buffer.
#[inline]
pub fn packed_len(width: usize, height: usize) -> usize {
    (width * height).div_ceil(2)
}

/// Output positions in scan order: bottom row first, right column first.
fn scan_order(width: usize, height: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..height)
        .rev()
        .flat_map(move |oy| (0..width).rev().map(move |ox| (ox, oy)))
}

/// Pack a quantized buffer into the sp6 bitstream.
///
/// Each pixel is resolved through [`nearest`], so a buffer that has not been
/// quantized still packs, just without dithering. Output length is always
/// [`packed_len`].
pub fn pack(buffer: &PixelBuffer, rotation: PanelRotation) -> Vec<u8> {
    let (width, height) = (buffer.width(), buffer.height());
    let mut out = Vec::with_capacity(packed_len(width, height));
    let mut pending: Option<u8> = None;

    for (ox, oy) in scan_order(width, height) {
        let (sx, sy) = rotation.source(ox, oy, width, height);
        let code = nearest(buffer.get(sx, sy)).code;
        match pending.take() {
            None => pending = Some(code),
            Some(first) => out.push((code << 4) | first),
        }
    }
    if let Some(last) = pending {
        out.push(last << 4);
    }
    out
}

/// Reverse [`pack`]: returns one palette code per source pixel, row-major.
///
/// The zero padding nibble of an odd-sized stream is ignored.
///
/// # Errors
///
/// [`CodecError::PackedLength`] when `bytes` has the wrong length and
/// [`CodecError::UnknownCode`] for a nibble outside the palette.
pub fn unpack(
    bytes: &[u8],
    width: usize,
    height: usize,
    rotation: PanelRotation,
) -> Result<Vec<u8>, CodecError> {
    let expected = packed_len(width, height);
    if bytes.len() != expected {
        return Err(CodecError::PackedLength {
            expected,
            actual: bytes.len(),
        });
    }

    let total = width * height;
    let mut codes = vec![0u8; total];
    for (i, (ox, oy)) in scan_order(width, height).enumerate() {
        let byte = bytes[i / 2];
        let trailing = i + 1 == total && total % 2 == 1;
        let code = if i % 2 == 1 || trailing {
            byte >> 4
        } else {
            byte & 0x0F
        };
        if by_code(code).is_none() {
            return Err(CodecError::UnknownCode(code));
        }
        let (sx, sy) = rotation.source(ox, oy, width, height);
        codes[sy * width + sx] = code;
    }
    Ok(codes)
}

/// Expand row-major palette codes into an opaque pixel buffer.
///
/// # Errors
///
/// [`CodecError::BufferLength`] on a count mismatch and
/// [`CodecError::UnknownCode`] for a code outside the palette.
pub fn codes_to_buffer(
    codes: &[u8],
    width: usize,
    height: usize,
) -> Result<PixelBuffer, CodecError> {
    let pixels = codes
        .iter()
        .map(|&code| {
            by_code(code)
                .map(|entry| entry.color)
                .ok_or(CodecError::UnknownCode(code))
        })
        .collect::<Result<Vec<Color>, _>>()?;
    PixelBuffer::new(width, height, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    #[test]
    fn test_rotation_normalises_degrees() {
        assert_eq!(PanelRotation::from_degrees(180), PanelRotation::Inverted);
        assert_eq!(PanelRotation::from_degrees(-180), PanelRotation::Inverted);
        assert_eq!(PanelRotation::from_degrees(540), PanelRotation::Inverted);
        assert_eq!(PanelRotation::from_degrees(0), PanelRotation::Upright);
        assert_eq!(PanelRotation::from_degrees(90), PanelRotation::Upright);
        assert_eq!(PanelRotation::from_degrees(270), PanelRotation::Upright);
    }

    #[test]
    fn test_black_two_by_two_is_all_zero() {
        let buffer = PixelBuffer::filled(2, 2, Color::BLACK);
        assert_eq!(pack(&buffer, PanelRotation::Inverted), vec![0x00, 0x00]);
    }

    #[test]
    fn test_red_top_left_inverted() {
        let mut buffer = PixelBuffer::filled(2, 2, Color::WHITE);
        buffer.set(0, 0, RED);
        assert_eq!(pack(&buffer, PanelRotation::Inverted), vec![0x13, 0x11]);
    }

    #[test]
    fn test_red_top_left_upright() {
        let mut buffer = PixelBuffer::filled(2, 2, Color::WHITE);
        buffer.set(0, 0, RED);
        // red is scanned last, as the high nibble of the second byte
        assert_eq!(pack(&buffer, PanelRotation::Upright), vec![0x11, 0x31]);
    }

    #[test]
    fn test_even_output_column_takes_high_nibble() {
        // 4x1 upright: scan is x=3,2,1,0
        let buffer = PixelBuffer::new(
            4,
            1,
            vec![Color::BLACK, Color::WHITE, RED, BLUE],
        )
        .unwrap();
        assert_eq!(pack(&buffer, PanelRotation::Upright), vec![0x35, 0x01]);
    }

    #[test]
    fn test_odd_count_pads_last_low_nibble() {
        let mut buffer = PixelBuffer::filled(3, 1, Color::WHITE);
        buffer.set(0, 0, BLUE);
        // scan x=2,1 -> 0x11, then x=0 alone -> 0x50
        assert_eq!(pack(&buffer, PanelRotation::Upright), vec![0x11, 0x50]);
    }

    #[test]
    fn test_packed_len_for_all_small_sizes() {
        for w in 1..9 {
            for h in 1..9 {
                let buffer = PixelBuffer::filled(w, h, Color::WHITE);
                assert_eq!(pack(&buffer, PanelRotation::Inverted).len(), packed_len(w, h));
                assert_eq!(packed_len(w, h), (w * h + 1) / 2);
            }
        }
    }

    #[test]
    fn test_unpack_inverts_pack() {
        let colors = [Color::BLACK, Color::WHITE, RED, BLUE, Color::rgb(0, 255, 0)];
        for (w, h) in [(2, 2), (3, 3), (5, 2), (4, 7)] {
            let mut buffer = PixelBuffer::filled(w, h, Color::WHITE);
            for y in 0..h {
                for x in 0..w {
                    buffer.set(x, y, colors[(x * 3 + y) % colors.len()]);
                }
            }
            for rotation in [PanelRotation::Upright, PanelRotation::Inverted] {
                let packed = pack(&buffer, rotation);
                let codes = unpack(&packed, w, h, rotation).unwrap();
                assert_eq!(codes_to_buffer(&codes, w, h).unwrap(), buffer);
            }
        }
    }

    #[test]
    fn test_unpack_rejects_wrong_length() {
        assert_eq!(
            unpack(&[0x11], 2, 2, PanelRotation::Inverted),
            Err(CodecError::PackedLength {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_unpack_rejects_unknown_code() {
        assert_eq!(
            unpack(&[0x14, 0x11], 2, 2, PanelRotation::Inverted),
            Err(CodecError::UnknownCode(4))
        );
    }
}
