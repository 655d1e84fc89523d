//! Heatshrink-compatible LZSS coder.
//!
//! The device firmware links the reference heatshrink decoder, so the
//! encoder here must emit exactly the bit grammar that decoder expects:
//!
//! ```text
//! literal   1 bbbbbbbb                      (tag bit, then the byte)
//! backref   0 iiii..i  cccc..c              (tag bit, distance - 1 in
//!                                            window_bits, length - 1 in
//!                                            lookahead_bits)
//! ```
//!
//! Bits are written MSB first and the final byte is zero padded. The
//! decoder's window starts zero-filled, so a back-reference may reach before
//! the start of output and read zeros.
//!
//! A back-reference costs `1 + window_bits + lookahead_bits` bits; matches
//! shorter than that many bytes (integer division by 8, plus one) are sent
//! as literals.

use crate::error::HeatshrinkError;

const MIN_WINDOW_BITS: u8 = 4;
const MAX_WINDOW_BITS: u8 = 15;
const MIN_LOOKAHEAD_BITS: u8 = 3;

const NO_POS: usize = usize::MAX;

/// Window and lookahead sizes, as powers of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatshrinkParams {
    window_bits: u8,
    lookahead_bits: u8,
}

impl HeatshrinkParams {
    /// The pair the device decoder is built with.
    pub const DEFAULT: Self = Self {
        window_bits: 10,
        lookahead_bits: 4,
    };

    /// # Errors
    ///
    /// Rejects window bits outside `4..=15` and lookahead bits below 3 or not
    /// below the window bits, mirroring the reference allocator.
    pub fn new(window_bits: u8, lookahead_bits: u8) -> Result<Self, HeatshrinkError> {
        if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
            return Err(HeatshrinkError::WindowBits(window_bits));
        }
        if lookahead_bits < MIN_LOOKAHEAD_BITS || lookahead_bits >= window_bits {
            return Err(HeatshrinkError::LookaheadBits {
                window: window_bits,
                lookahead: lookahead_bits,
            });
        }
        Ok(Self {
            window_bits,
            lookahead_bits,
        })
    }

    #[inline]
    pub fn window_bits(&self) -> u8 {
        self.window_bits
    }

    #[inline]
    pub fn lookahead_bits(&self) -> u8 {
        self.lookahead_bits
    }

    fn window_size(&self) -> usize {
        1 << self.window_bits
    }

    fn lookahead_size(&self) -> usize {
        1 << self.lookahead_bits
    }

    /// Shortest match worth a back-reference.
    fn min_match(&self) -> usize {
        (1 + self.window_bits as usize + self.lookahead_bits as usize) / 8 + 1
    }
}

impl Default for HeatshrinkParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

struct BitWriter {
    out: Vec<u8>,
    current: u8,
    filled: u8,
}

impl BitWriter {
    fn new(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            current: 0,
            filled: 0,
        }
    }

    fn push(&mut self, value: u32, count: u8) {
        for shift in (0..count).rev() {
            self.current = (self.current << 1) | ((value >> shift) & 1) as u8;
            self.filled += 1;
            if self.filled == 8 {
                self.out.push(self.current);
                self.current = 0;
                self.filled = 0;
            }
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.out.push(self.current << (8 - self.filled));
        }
        self.out
    }
}

struct BitReader<'a> {
    input: &'a [u8],
    bit: usize,
}

impl<'a> BitReader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, bit: 0 }
    }

    /// Next `count` bits, or `None` if the input runs out first.
    fn take(&mut self, count: u8) -> Option<u32> {
        if self.bit + count as usize > self.input.len() * 8 {
            return None;
        }
        let mut value = 0u32;
        for _ in 0..count {
            let byte = self.input[self.bit / 8];
            let bit = (byte >> (7 - self.bit % 8)) & 1;
            value = (value << 1) | bit as u32;
            self.bit += 1;
        }
        Some(value)
    }
}

/// Compress `input`.
///
/// Match search walks a chain of earlier positions holding the same byte,
/// nearest first, and keeps the longest match within the window. Matches
/// may overlap the bytes they produce.
pub fn encode(input: &[u8], params: HeatshrinkParams) -> Vec<u8> {
    let window = params.window_size();
    let lookahead = params.lookahead_size();
    let min_match = params.min_match();

    // previous position holding the same byte value
    let mut chain = vec![NO_POS; input.len()];
    let mut last = [NO_POS; 256];
    for (i, &byte) in input.iter().enumerate() {
        chain[i] = last[byte as usize];
        last[byte as usize] = i;
    }

    let mut bits = BitWriter::new(input.len() / 2 + 1);
    let mut i = 0;
    while i < input.len() {
        let max_len = lookahead.min(input.len() - i);
        let (distance, length) = longest_match(input, &chain, i, window, max_len);

        if length >= min_match {
            bits.push(0, 1);
            bits.push((distance - 1) as u32, params.window_bits);
            bits.push((length - 1) as u32, params.lookahead_bits);
            i += length;
        } else {
            bits.push(1, 1);
            bits.push(input[i] as u32, 8);
            i += 1;
        }
    }
    bits.finish()
}

/// Longest match for `input[at..]` in the preceding window, as
/// `(distance, length)`. Length 0 means no candidate.
fn longest_match(
    input: &[u8],
    chain: &[usize],
    at: usize,
    window: usize,
    max_len: usize,
) -> (usize, usize) {
    let mut best = (0, 0);
    let mut pos = chain[at];
    while pos != NO_POS && at - pos <= window {
        let best_len = best.1;
        // cheap reject on the byte that would extend the current best
        if best_len < max_len && input[pos + best_len] == input[at + best_len] {
            let len = (0..max_len)
                .take_while(|&k| input[pos + k] == input[at + k])
                .count();
            if len > best_len {
                best = (at - pos, len);
                if len == max_len {
                    break;
                }
            }
        }
        pos = chain[pos];
    }
    best
}

/// Decompress exactly `expected_len` bytes.
///
/// # Errors
///
/// [`HeatshrinkError::Truncated`] when the bit stream ends early and
/// [`HeatshrinkError::Overrun`] when a back-reference would produce more
/// than `expected_len` bytes.
pub fn decode(
    input: &[u8],
    params: HeatshrinkParams,
    expected_len: usize,
) -> Result<Vec<u8>, HeatshrinkError> {
    let mut out: Vec<u8> = Vec::with_capacity(expected_len.min(input.len().saturating_mul(8)));
    let mut bits = BitReader::new(input);
    let truncated = |produced| HeatshrinkError::Truncated {
        expected: expected_len,
        produced,
    };

    while out.len() < expected_len {
        let tag = bits.take(1).ok_or_else(|| truncated(out.len()))?;
        if tag == 1 {
            let byte = bits.take(8).ok_or_else(|| truncated(out.len()))?;
            out.push(byte as u8);
            continue;
        }

        let distance = bits
            .take(params.window_bits)
            .ok_or_else(|| truncated(out.len()))? as usize
            + 1;
        let length = bits
            .take(params.lookahead_bits)
            .ok_or_else(|| truncated(out.len()))? as usize
            + 1;
        if out.len() + length > expected_len {
            return Err(HeatshrinkError::Overrun {
                expected: expected_len,
            });
        }
        for _ in 0..length {
            // reaching before the start reads the zero-filled window
            let byte = out.len().checked_sub(distance).map_or(0, |src| out[src]);
            out.push(byte);
        }
    }
    Ok(out)
}
