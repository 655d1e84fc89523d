//! Error types for the codec.
//!
//! Conversion itself has a single failure mode (a buffer that does not fit
//! the panel). The remaining types belong to the decoders, which read
//! untrusted byte streams.

use thiserror::Error;

/// Errors raised by [`Converter::convert`](crate::Converter::convert) and the
/// pixel buffer constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Buffer dimensions are zero, non-square, or differ from the panel.
    #[error("invalid dimensions: {width}x{height} (panel expects {expected}x{expected})")]
    InvalidDimensions {
        width: usize,
        height: usize,
        expected: usize,
    },

    /// Pixel data length does not match the declared dimensions.
    #[error("buffer holds {actual} values, expected {expected} for {width}x{height}")]
    BufferLength {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// Packed bitstream length does not match `ceil(width * height / 2)`.
    #[error("packed bitstream is {actual} bytes, expected {expected}")]
    PackedLength { expected: usize, actual: usize },

    /// A nibble in a packed bitstream is not a palette code.
    #[error("unknown palette code {0:#x}")]
    UnknownCode(u8),
}

/// Errors raised while decoding an RLE stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RleError {
    #[error("stream too short for RLE header ({0} bytes)")]
    TruncatedHeader(usize),

    #[error("bad RLE magic {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("dangling byte at offset {0}, records are two bytes long")]
    TruncatedRecord(usize),

    #[error("zero-length run at offset {0}")]
    ZeroRun(usize),

    #[error("run value {value:#x} at offset {offset} does not fit in a nibble")]
    InvalidNibble { offset: usize, value: u8 },

    #[error("runs decode to more than the declared {expected} nibbles")]
    Overflow { expected: usize },

    #[error("runs decode to {actual} nibbles, expected {expected}")]
    Underflow { expected: usize, actual: usize },
}

/// Errors raised by the heatshrink parameters and decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeatshrinkError {
    #[error("window bits {0} outside 4..=15")]
    WindowBits(u8),

    #[error("lookahead bits {lookahead} must be at least 3 and below window bits {window}")]
    LookaheadBits { window: u8, lookahead: u8 },

    #[error("compressed stream ended after {produced} of {expected} bytes")]
    Truncated { expected: usize, produced: usize },

    #[error("back-reference writes past the declared {expected} bytes")]
    Overrun { expected: usize },
}

/// Errors raised while unwrapping an entropy-coded stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntropyError {
    #[error("stream too short for entropy header ({0} bytes)")]
    TruncatedHeader(usize),

    #[error("bad entropy magic {0:02x?}")]
    BadMagic([u8; 4]),

    #[error(transparent)]
    Heatshrink(#[from] HeatshrinkError),
}
