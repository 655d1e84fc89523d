//! 8-bit RGBA color.

/// An sRGB color with straight alpha, 8 bits per channel.
///
/// Quantization only looks at the RGB channels. Alpha is carried along so a
/// quantized buffer can be shown as a preview with its original coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque color from RGB channels.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// RGB channels as floats, the working form of the quantizer.
    #[inline]
    pub fn to_f32(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }

    /// Replace the RGB channels, keeping alpha.
    #[inline]
    pub fn with_rgb(self, rgb: Color) -> Self {
        Self { a: self.a, ..rgb }
    }

    /// Build from float channels, rounding and clamping each to `0..=255`.
    #[inline]
    pub fn from_f32_clamped(rgb: [f32; 3], a: u8) -> Self {
        let channel = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        Self {
            r: channel(rgb[0]),
            g: channel(rgb[1]),
            b: channel(rgb[2]),
            a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_rgb_keeps_alpha() {
        let translucent = Color::rgba(10, 20, 30, 40);
        let replaced = translucent.with_rgb(Color::WHITE);
        assert_eq!(replaced, Color::rgba(255, 255, 255, 40));
    }

    #[test]
    fn test_from_f32_clamps_out_of_range() {
        let color = Color::from_f32_clamped([-12.0, 127.6, 300.0], 7);
        assert_eq!(color, Color::rgba(0, 128, 255, 7));
    }
}
