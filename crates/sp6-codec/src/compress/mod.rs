//! Compression of the packed bitstream.
//!
//! Two candidates are produced for every conversion, [`rle`] and
//! [`entropy`], and [`select`] keeps whichever is shortest, falling back to
//! the raw stream when neither helps.

pub mod entropy;
pub mod heatshrink;
pub mod rle;
pub mod select;

pub use entropy::{EntropyEngine, HeatshrinkEngine, LazyEngine, Unavailable};
pub use heatshrink::HeatshrinkParams;
pub use select::{select, PayloadFormat, Selection};
