//! Test fixtures and constants.

use image::{Rgba, RgbaImage};
use sp6_codec::{Converter, PanelRotation, PanelSpec};
use std::path::{Path, PathBuf};

/// Panel side used by integration tests; small enough to keep runs fast.
pub const PANEL_SIZE: u32 = 32;

/// Pure palette colors as RGBA.
pub mod colors {
    use image::Rgba;

    pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
}

/// Panel matching [`PANEL_SIZE`], mounted upside down.
pub fn test_panel() -> PanelSpec {
    PanelSpec::new(PANEL_SIZE as usize, PanelRotation::Inverted)
}

pub fn test_converter() -> Converter {
    Converter::with_heatshrink(test_panel(), 10, 4)
}

/// Write a solid-color PNG into `dir`.
pub fn write_solid_png(
    dir: &Path,
    name: &str,
    width: u32,
    height: u32,
    color: Rgba<u8>,
) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, color)
        .save(&path)
        .expect("Failed to write fixture PNG");
    path
}

/// Write a PNG split vertically: left half `left`, right half `right`.
pub fn write_split_png(
    dir: &Path,
    name: &str,
    side: u32,
    left: Rgba<u8>,
    right: Rgba<u8>,
) -> PathBuf {
    let path = dir.join(name);
    let img = RgbaImage::from_fn(side, side, |x, _| if x < side / 2 { left } else { right });
    img.save(&path).expect("Failed to write fixture PNG");
    path
}
