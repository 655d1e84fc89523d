//! Turn an arbitrary source image into a panel-sized pixel buffer.
//!
//! The image is rotated by a user-chosen quarter turn, scaled to cover the
//! square canvas, centred, shifted by a pixel offset and composited over the
//! paper-colored background. Anything the image does not cover keeps the
//! background color.

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use sp6_codec::PixelBuffer;
use std::path::Path;
use tracing::debug;

use crate::error::ComposeError;

/// Canvas color behind the image (`#f7f5f1`).
pub const BACKGROUND: Rgba<u8> = Rgba([0xf7, 0xf5, 0xf1, 0xff]);

/// Clockwise user rotation applied before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuarterTurn {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl QuarterTurn {
    pub fn from_degrees(degrees: i32) -> Result<Self, ComposeError> {
        match degrees.rem_euclid(360) {
            0 => Ok(Self::None),
            90 => Ok(Self::Cw90),
            180 => Ok(Self::Cw180),
            270 => Ok(Self::Cw270),
            _ => Err(ComposeError::Rotation(degrees)),
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    fn apply(&self, img: &DynamicImage) -> DynamicImage {
        match self {
            Self::None => img.clone(),
            Self::Cw90 => img.rotate90(),
            Self::Cw180 => img.rotate180(),
            Self::Cw270 => img.rotate270(),
        }
    }
}

/// Framing of the source image on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropParams {
    pub rotation: QuarterTurn,
    /// Multiplier on the cover-fit scale. `1.0` exactly covers the canvas.
    pub zoom: f32,
    /// Horizontal shift in canvas pixels, positive to the right.
    pub offset_x: i32,
    /// Vertical shift in canvas pixels, positive downwards.
    pub offset_y: i32,
}

impl Default for CropParams {
    fn default() -> Self {
        Self {
            rotation: QuarterTurn::None,
            zoom: 1.0,
            offset_x: 0,
            offset_y: 0,
        }
    }
}

/// Read and decode an image file in any format the `image` crate enables.
pub fn load_image(path: &Path) -> Result<DynamicImage, ComposeError> {
    let bytes = std::fs::read(path).map_err(|source| ComposeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let img = image::load_from_memory(&bytes)?;
    debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "Loaded source image"
    );
    Ok(img)
}

/// Compose `img` onto a `side` x `side` canvas.
pub fn compose(img: &DynamicImage, side: u32, crop: &CropParams) -> Result<PixelBuffer, ComposeError> {
    if !crop.zoom.is_finite() || crop.zoom <= 0.0 {
        return Err(ComposeError::Zoom(crop.zoom));
    }
    let rotated = crop.rotation.apply(img);
    let (w, h) = (rotated.width(), rotated.height());
    if w == 0 || h == 0 || side == 0 {
        return Err(ComposeError::Empty);
    }

    let cover = (side as f64 / w as f64).max(side as f64 / h as f64);
    let scale = cover * crop.zoom as f64;
    let new_w = ((w as f64 * scale).round() as u32).max(1);
    let new_h = ((h as f64 * scale).round() as u32).max(1);
    debug!(
        w,
        h,
        new_w,
        new_h,
        rotation = crop.rotation.degrees(),
        "Scaling image onto canvas"
    );

    let resized = if (new_w, new_h) == (w, h) {
        rotated.to_rgba8()
    } else {
        rotated
            .resize_exact(new_w, new_h, FilterType::Lanczos3)
            .to_rgba8()
    };

    let mut canvas = RgbaImage::from_pixel(side, side, BACKGROUND);
    let x = (side as i64 - new_w as i64) / 2 + crop.offset_x as i64;
    let y = (side as i64 - new_h as i64) / 2 + crop.offset_y as i64;
    image::imageops::overlay(&mut canvas, &resized, x, y);

    Ok(PixelBuffer::from_rgba(
        side as usize,
        side as usize,
        canvas.as_raw(),
    )?)
}
