//! sp6-codec: image codec for six-color e-paper panels
//!
//! Turns a finished, panel-sized RGBA buffer into the byte stream the panel
//! controller consumes: each pixel becomes one of six 4-bit palette codes,
//! two codes share a byte, and the resulting bitstream is shipped either as
//! is or in whichever of two compressed encodings is shorter.
//!
//! # Quick Start
//!
//! ```
//! use sp6_codec::{Color, ConvertOptions, Converter, PanelRotation, PanelSpec, PixelBuffer};
//!
//! let converter = Converter::with_heatshrink(PanelSpec::new(8, PanelRotation::Inverted), 10, 4);
//! let buffer = PixelBuffer::filled(8, 8, Color::rgb(250, 250, 250));
//!
//! let conversion = converter.convert(buffer, &ConvertOptions::new()).unwrap();
//! assert_eq!(conversion.raw.len(), 32);
//! assert!(conversion.payload.len() <= conversion.raw.len());
//! ```
//!
//! # Pipeline
//!
//! | Stage | Module |
//! |---|---|
//! | green gain | [`tone`] |
//! | nearest color / error diffusion | [`quantize`], [`palette`] |
//! | round panel corners | [`mask`] |
//! | two codes per byte, panel scan order | [`pack`] |
//! | `SP6R` runs, `HSK1` heatshrink, best-of | [`compress`] |
//!
//! The codec performs no I/O. Composing the buffer from a source image and
//! delivering the payload are the caller's business.
//!
//! # Palette codes
//!
//! | Color | Code |
//! |---|---|
//! | black | `0x0` |
//! | white | `0x1` |
//! | yellow | `0x2` |
//! | red | `0x3` |
//! | blue | `0x5` |
//! | green | `0x6` |
//!
//! Code `0x4` is not used by the panel.

pub mod buffer;
pub mod color;
pub mod compress;
pub mod convert;
pub mod error;
pub mod mask;
pub mod pack;
pub mod palette;
pub mod quantize;
pub mod tone;


pub use buffer::PixelBuffer;
pub use color::Color;
pub use compress::{
    EntropyEngine, HeatshrinkEngine, HeatshrinkParams, LazyEngine, PayloadFormat, Unavailable,
};
pub use convert::{Conversion, ConvertOptions, Converter, PanelSpec};
pub use error::{CodecError, EntropyError, HeatshrinkError, RleError};
pub use pack::PanelRotation;
pub use palette::{PaletteEntry, PALETTE};
pub use quantize::Quantizer;
pub use tone::ToneGain;
