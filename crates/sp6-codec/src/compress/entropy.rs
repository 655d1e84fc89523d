//! Entropy-coded candidate (`HSK1`).
//!
//! # Layout
//!
//! ```text
//! "HSK1"  u32 LE raw byte count  u8 window_bits  u8 lookahead_bits  payload
//! ```
//!
//! The compressor sits behind [`EntropyEngine`] so the converter does not
//! care whether one is present. An engine that cannot produce output returns
//! `None`; that is not an error and the selector simply has one fewer
//! candidate.

use std::sync::OnceLock;

use crate::error::EntropyError;

use super::heatshrink::{self, HeatshrinkParams};

pub const MAGIC: &[u8; 4] = b"HSK1";

/// Magic, length prefix and the two parameter bytes.
pub const HEADER_LEN: usize = 10;

/// Engine output before framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    pub params: HeatshrinkParams,
    pub payload: Vec<u8>,
}

/// Narrow contract for an optional compression engine.
pub trait EntropyEngine: Send + Sync {
    /// Compress `raw`, or `None` when the engine is unavailable.
    fn try_compress(&self, raw: &[u8]) -> Option<Compressed>;

    fn name(&self) -> &'static str;
}

/// In-process heatshrink encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatshrinkEngine {
    params: HeatshrinkParams,
}

impl HeatshrinkEngine {
    pub fn new(params: HeatshrinkParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> HeatshrinkParams {
        self.params
    }
}

impl EntropyEngine for HeatshrinkEngine {
    fn try_compress(&self, raw: &[u8]) -> Option<Compressed> {
        Some(Compressed {
            params: self.params,
            payload: heatshrink::encode(raw, self.params),
        })
    }

    fn name(&self) -> &'static str {
        "heatshrink"
    }
}

/// Engine that never produces output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl EntropyEngine for Unavailable {
    fn try_compress(&self, _raw: &[u8]) -> Option<Compressed> {
        None
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

/// Heatshrink engine built on first use.
///
/// The raw parameter pair is validated once, the first time a conversion
/// asks for compression. Invalid parameters log a warning and leave the
/// engine permanently unavailable; conversions keep working without the
/// entropy candidate. Later calls reuse the outcome without re-validating.
#[derive(Debug)]
pub struct LazyEngine {
    window_bits: u8,
    lookahead_bits: u8,
    engine: OnceLock<Option<HeatshrinkEngine>>,
}

impl LazyEngine {
    pub fn new(window_bits: u8, lookahead_bits: u8) -> Self {
        Self {
            window_bits,
            lookahead_bits,
            engine: OnceLock::new(),
        }
    }

    /// Whether initialisation has run, successfully or not.
    pub fn is_initialized(&self) -> bool {
        self.engine.get().is_some()
    }

    fn engine(&self) -> Option<&HeatshrinkEngine> {
        self.engine
            .get_or_init(|| {
                match HeatshrinkParams::new(self.window_bits, self.lookahead_bits) {
                    Ok(params) => {
                        tracing::debug!(
                            window_bits = self.window_bits,
                            lookahead_bits = self.lookahead_bits,
                            "heatshrink engine ready"
                        );
                        Some(HeatshrinkEngine::new(params))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "heatshrink engine unavailable, skipping entropy candidate");
                        None
                    }
                }
            })
            .as_ref()
    }
}

impl Default for LazyEngine {
    fn default() -> Self {
        let params = HeatshrinkParams::DEFAULT;
        Self::new(params.window_bits(), params.lookahead_bits())
    }
}

impl EntropyEngine for LazyEngine {
    fn try_compress(&self, raw: &[u8]) -> Option<Compressed> {
        self.engine()?.try_compress(raw)
    }

    fn name(&self) -> &'static str {
        "heatshrink (lazy)"
    }
}

/// Compress `raw` with `engine` and wrap the result in the `HSK1` frame.
pub fn compress(engine: &dyn EntropyEngine, raw: &[u8]) -> Option<Vec<u8>> {
    let Compressed { params, payload } = engine.try_compress(raw)?;
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(raw.len() as u32).to_le_bytes());
    out.push(params.window_bits());
    out.push(params.lookahead_bits());
    out.extend_from_slice(&payload);
    Some(out)
}

/// A parsed `HSK1` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    pub raw_len: usize,
    pub params: HeatshrinkParams,
    pub payload: &'a [u8],
}

/// Parse the `HSK1` header.
///
/// # Errors
///
/// Short input, wrong magic, or parameter bytes the decoder cannot use.
pub fn unwrap(stream: &[u8]) -> Result<Frame<'_>, EntropyError> {
    if stream.len() < HEADER_LEN {
        return Err(EntropyError::TruncatedHeader(stream.len()));
    }
    let magic = [stream[0], stream[1], stream[2], stream[3]];
    if &magic != MAGIC {
        return Err(EntropyError::BadMagic(magic));
    }
    let raw_len = u32::from_le_bytes([stream[4], stream[5], stream[6], stream[7]]) as usize;
    let params = HeatshrinkParams::new(stream[8], stream[9])?;
    Ok(Frame {
        raw_len,
        params,
        payload: &stream[HEADER_LEN..],
    })
}

/// Unwrap and decode an `HSK1` stream back to the packed bytes.
pub fn decompress(stream: &[u8]) -> Result<Vec<u8>, EntropyError> {
    let frame = unwrap(stream)?;
    Ok(heatshrink::decode(frame.payload, frame.params, frame.raw_len)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeatshrinkError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frame_header() {
        let raw = vec![0x11; 300];
        let framed = compress(&HeatshrinkEngine::default(), &raw).unwrap();
        assert_eq!(&framed[..4], b"HSK1");
        assert_eq!(&framed[4..8], &300u32.to_le_bytes());
        assert_eq!(&framed[8..10], &[10, 4]);
        assert_eq!(decompress(&framed).unwrap(), raw);
    }

    #[test]
    fn test_unavailable_engine_yields_nothing() {
        assert_eq!(compress(&Unavailable, &[1, 2, 3]), None);
    }

    #[test]
    fn test_lazy_engine_initialises_once() {
        let engine = LazyEngine::default();
        assert!(!engine.is_initialized());
        let first = compress(&engine, &[0x33; 64]).unwrap();
        assert!(engine.is_initialized());
        let second = compress(&engine, &[0x33; 64]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_lazy_engine_with_bad_params_is_unavailable() {
        let engine = LazyEngine::new(20, 4);
        assert_eq!(compress(&engine, &[0x33; 64]), None);
        assert!(engine.is_initialized());
        assert_eq!(compress(&engine, &[0x33; 64]), None);
    }

    #[test]
    fn test_unwrap_rejects_bad_input() {
        assert_eq!(unwrap(b"HSK1"), Err(EntropyError::TruncatedHeader(4)));
        assert_eq!(
            unwrap(b"ZZZZ\0\0\0\0\x0a\x04"),
            Err(EntropyError::BadMagic(*b"ZZZZ"))
        );
        assert_eq!(
            unwrap(b"HSK1\0\0\0\0\x0a\x0a"),
            Err(EntropyError::Heatshrink(HeatshrinkError::LookaheadBits {
                window: 10,
                lookahead: 10
            }))
        );
    }

    #[test]
    fn test_empty_raw_frames_to_header_only() {
        let framed = compress(&HeatshrinkEngine::default(), &[]).unwrap();
        assert_eq!(framed.len(), HEADER_LEN);
        assert_eq!(decompress(&framed).unwrap(), Vec::<u8>::new());
    }
}
