//! Per-channel tone gain applied ahead of quantization.
//!
//! The panel's green pigment reads noticeably darker than its nominal RGB,
//! so the pipeline lets callers scale the green channel before the palette
//! match. Red and blue stay at unit gain. The adjusted value feeds both the
//! flat quantizer and the error-diffusion arena, so dithering sees the same
//! colors the flat path would.

use crate::color::Color;

/// Largest accepted gain. Anything above saturates a mid-tone channel.
pub const MAX_GAIN: f32 = 4.0;

/// Multiplicative gain per RGB channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneGain {
    red: f32,
    green: f32,
    blue: f32,
}

impl ToneGain {
    /// Unit gain on every channel.
    pub const IDENTITY: Self = Self {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
    };

    /// Gain with the given green multiplier.
    ///
    /// Non-finite values fall back to `1.0`; the rest are clamped to
    /// `0.0..=MAX_GAIN`.
    pub fn green(gain: f32) -> Self {
        Self {
            green: sanitize(gain),
            ..Self::IDENTITY
        }
    }

    #[inline]
    pub fn green_gain(&self) -> f32 {
        self.green
    }

    /// True when every channel is at unit gain.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Scale each channel and clamp to `0.0..=255.0`.
    #[inline]
    pub fn adjust(&self, color: Color) -> [f32; 3] {
        let [r, g, b] = color.to_f32();
        [
            (r * self.red).clamp(0.0, 255.0),
            (g * self.green).clamp(0.0, 255.0),
            (b * self.blue).clamp(0.0, 255.0),
        ]
    }
}

impl Default for ToneGain {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn sanitize(gain: f32) -> f32 {
    if gain.is_finite() {
        gain.clamp(0.0, MAX_GAIN)
    } else {
        1.0
    }
}
