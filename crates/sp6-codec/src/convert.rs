//! The conversion entry point.
//!
//! [`Converter::convert`] runs the whole pipeline on one finished buffer:
//!
//! ```text
//! validate -> tone + quantize -> mask (opt-in) -> pack
//!          -> { rle, entropy } -> select
//! ```
//!
//! A converter is reusable across images and cheap to share behind an
//! `Arc`; the only state it carries is the entropy engine, whose one-shot
//! initialisation is idempotent.

use std::sync::Arc;

use crate::buffer::PixelBuffer;
use crate::compress::{entropy, rle, select, EntropyEngine, LazyEngine, PayloadFormat};
use crate::error::CodecError;
use crate::mask::apply_circular_mask;
use crate::pack::{pack, PanelRotation};
use crate::quantize::{Quantize, Quantizer};
use crate::tone::ToneGain;

/// Geometry of the target panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSpec {
    size: usize,
    rotation: PanelRotation,
}

impl PanelSpec {
    /// 400x400, mounted upside down.
    pub const REFERENCE: Self = Self {
        size: 400,
        rotation: PanelRotation::Inverted,
    };

    pub fn new(size: usize, rotation: PanelRotation) -> Self {
        Self { size, rotation }
    }

    /// Side length in pixels.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn rotation(&self) -> PanelRotation {
        self.rotation
    }

    /// Packed bitstream length for this panel.
    pub fn packed_len(&self) -> usize {
        crate::pack::packed_len(self.size, self.size)
    }

    /// Check that a buffer is square, non-empty and panel sized.
    pub fn validate(&self, width: usize, height: usize) -> Result<(), CodecError> {
        if width == 0 || height == 0 || width != height || width != self.size {
            return Err(CodecError::InvalidDimensions {
                width,
                height,
                expected: self.size,
            });
        }
        Ok(())
    }
}

impl Default for PanelSpec {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Per-conversion options.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConvertOptions {
    gain: ToneGain,
    quantizer: Quantizer,
    round_mask: bool,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Green channel gain. Sanitised, see [`ToneGain::green`].
    pub fn tone_gain(mut self, gain: f32) -> Self {
        self.gain = ToneGain::green(gain);
        self
    }

    /// Enable Floyd-Steinberg error diffusion.
    pub fn dither(mut self, enabled: bool) -> Self {
        self.quantizer = Quantizer::from_dither_flag(enabled);
        self
    }

    /// Whiten everything outside the inscribed disk.
    pub fn round_mask(mut self, enabled: bool) -> Self {
        self.round_mask = enabled;
        self
    }

    pub fn gain(&self) -> ToneGain {
        self.gain
    }

    pub fn quantizer(&self) -> Quantizer {
        self.quantizer
    }

    pub fn is_round(&self) -> bool {
        self.round_mask
    }
}

/// Everything a conversion produces.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The packed sp6 bitstream.
    pub raw: Vec<u8>,
    /// The bytes to send: `raw` or one of its encodings.
    pub payload: Vec<u8>,
    pub format: PayloadFormat,
    /// Length of the RLE candidate.
    pub rle_len: usize,
    /// Length of the entropy candidate, `None` when the engine gave none.
    pub entropy_len: Option<usize>,
    /// The buffer after quantization and masking.
    pub quantized: PixelBuffer,
}

impl Conversion {
    /// `payload.len() / raw.len()`.
    pub fn ratio(&self) -> f64 {
        if self.raw.is_empty() {
            return 1.0;
        }
        self.payload.len() as f64 / self.raw.len() as f64
    }
}

/// Converts panel-sized buffers into device payloads.
pub struct Converter {
    panel: PanelSpec,
    engine: Arc<dyn EntropyEngine>,
}

impl Converter {
    pub fn new(panel: PanelSpec, engine: Arc<dyn EntropyEngine>) -> Self {
        Self { panel, engine }
    }

    /// Converter with a lazily built heatshrink engine.
    pub fn with_heatshrink(panel: PanelSpec, window_bits: u8, lookahead_bits: u8) -> Self {
        Self::new(panel, Arc::new(LazyEngine::new(window_bits, lookahead_bits)))
    }

    pub fn panel(&self) -> PanelSpec {
        self.panel
    }

    pub fn engine(&self) -> &dyn EntropyEngine {
        self.engine.as_ref()
    }

    /// Convert one buffer.
    ///
    /// # Errors
    ///
    /// [`CodecError::InvalidDimensions`] when the buffer does not match the
    /// panel. Validation happens before any pixel is touched.
    pub fn convert(
        &self,
        mut buffer: PixelBuffer,
        options: &ConvertOptions,
    ) -> Result<Conversion, CodecError> {
        self.panel.validate(buffer.width(), buffer.height())?;

        options.quantizer().quantize(&mut buffer, &options.gain());
        if options.is_round() {
            apply_circular_mask(&mut buffer);
        }

        let raw = pack(&buffer, self.panel.rotation());
        let rle = rle::encode(&raw);
        let hsk = entropy::compress(self.engine.as_ref(), &raw);
        tracing::debug!(
            quantizer = options.quantizer().name(),
            raw = raw.len(),
            rle = rle.len(),
            entropy = ?hsk.as_ref().map(Vec::len),
            "encoded candidates"
        );

        let rle_len = rle.len();
        let entropy_len = hsk.as_ref().map(Vec::len);
        let format = select(&raw, &rle, hsk.as_deref()).format;
        let payload = match format {
            PayloadFormat::Entropy => hsk.unwrap_or_default(),
            PayloadFormat::Rle => rle,
            PayloadFormat::Raw => raw.clone(),
        };
        tracing::info!(
            format = format.tag(),
            bytes = payload.len(),
            raw = raw.len(),
            "selected payload"
        );

        Ok(Conversion {
            raw,
            payload,
            format,
            rle_len,
            entropy_len,
            quantized: buffer,
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(PanelSpec::REFERENCE, Arc::new(LazyEngine::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::compress::Unavailable;

    fn small_converter(size: usize) -> Converter {
        Converter::new(
            PanelSpec::new(size, PanelRotation::Inverted),
            Arc::new(LazyEngine::default()),
        )
    }

    #[test]
    fn test_rejects_non_square_buffer() {
        let err = small_converter(4)
            .convert(PixelBuffer::filled(4, 3, Color::WHITE), &ConvertOptions::new())
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidDimensions {
                width: 4,
                height: 3,
                expected: 4
            }
        );
    }

    #[test]
    fn test_rejects_empty_and_mismatched_buffers() {
        let converter = small_converter(4);
        let options = ConvertOptions::new();
        assert!(converter
            .convert(PixelBuffer::filled(0, 0, Color::WHITE), &options)
            .is_err());
        assert!(converter
            .convert(PixelBuffer::filled(8, 8, Color::WHITE), &options)
            .is_err());
    }

    #[test]
    fn test_uniform_image_compresses() {
        let conversion = small_converter(64)
            .convert(PixelBuffer::filled(64, 64, Color::WHITE), &ConvertOptions::new())
            .unwrap();
        assert_eq!(conversion.raw.len(), 2048);
        assert!(conversion.raw.iter().all(|&b| b == 0x11));
        assert_eq!(conversion.rle_len, 8 + 17 * 2);
        assert_ne!(conversion.format, PayloadFormat::Raw);
        assert!(conversion.ratio() < 0.05);
    }

    #[test]
    fn test_without_engine_picks_rle() {
        let converter = Converter::new(
            PanelSpec::new(64, PanelRotation::Inverted),
            Arc::new(Unavailable),
        );
        let conversion = converter
            .convert(PixelBuffer::filled(64, 64, Color::BLACK), &ConvertOptions::new())
            .unwrap();
        assert_eq!(conversion.entropy_len, None);
        assert_eq!(conversion.format, PayloadFormat::Rle);
        assert_eq!(rle::decode(&conversion.payload).unwrap(), conversion.raw);
    }

    #[test]
    fn test_round_mask_whitens_corners() {
        let conversion = small_converter(4)
            .convert(
                PixelBuffer::filled(4, 4, Color::BLACK),
                &ConvertOptions::new().round_mask(true),
            )
            .unwrap();
        assert_eq!(conversion.quantized.get(0, 0), Color::WHITE);
        assert_eq!(conversion.quantized.get(1, 1), Color::BLACK);
    }

    #[test]
    fn test_options_builder() {
        let options = ConvertOptions::new().tone_gain(1.2).dither(true).round_mask(true);
        assert_eq!(options.quantizer(), Quantizer::FloydSteinberg);
        assert!(options.is_round());
        assert_eq!(options.gain().green_gain(), 1.2);
    }
}
