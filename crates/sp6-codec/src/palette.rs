//! The panel's fixed six-color palette and nearest-color lookup.
//!
//! Device codes are *not* the positions in [`PALETTE`]: code 4 is reserved by
//! the panel controller, so blue and green sit at codes 5 and 6. Every entry
//! carries its code explicitly and nothing in the crate derives a code from an
//! index.

use crate::color::Color;

/// One palette color and the 4-bit code the panel uses for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: &'static str,
    pub color: Color,
    /// Device code, always `<= 0x0F`.
    pub code: u8,
}

impl PaletteEntry {
    const fn new(name: &'static str, r: u8, g: u8, b: u8, code: u8) -> Self {
        Self {
            name,
            color: Color::rgb(r, g, b),
            code,
        }
    }

    /// Squared Euclidean RGB distance to `rgb`.
    #[inline]
    pub fn distance_sq(&self, rgb: [f32; 3]) -> f32 {
        let dr = rgb[0] - self.color.r as f32;
        let dg = rgb[1] - self.color.g as f32;
        let db = rgb[2] - self.color.b as f32;
        dr * dr + dg * dg + db * db
    }
}

/// Palette entries in tie-break order.
pub const PALETTE: [PaletteEntry; 6] = [
    PaletteEntry::new("black", 0, 0, 0, 0x0),
    PaletteEntry::new("white", 255, 255, 255, 0x1),
    PaletteEntry::new("yellow", 255, 255, 0, 0x2),
    PaletteEntry::new("red", 255, 0, 0, 0x3),
    PaletteEntry::new("blue", 0, 0, 255, 0x5),
    PaletteEntry::new("green", 0, 255, 0, 0x6),
];

/// Nearest palette entry to an 8-bit color. Alpha is ignored.
#[inline]
pub fn nearest(color: Color) -> &'static PaletteEntry {
    nearest_rgb(color.to_f32())
}

/// Nearest palette entry to a float RGB triple.
///
/// Values outside `0..=255` are accepted; the error-diffusion buffer
/// routinely overshoots. Equidistant candidates resolve to the entry that
/// comes first in [`PALETTE`].
pub fn nearest_rgb(rgb: [f32; 3]) -> &'static PaletteEntry {
    let mut best = &PALETTE[0];
    let mut best_dist = f32::INFINITY;
    for entry in &PALETTE {
        let dist = entry.distance_sq(rgb);
        // strict: the earlier entry keeps a tie
        if dist < best_dist {
            best = entry;
            best_dist = dist;
        }
    }
    best
}

/// Entry for a device code, or `None` for codes the panel does not define.
pub fn by_code(code: u8) -> Option<&'static PaletteEntry> {
    PALETTE.iter().find(|entry| entry.code == code)
}
