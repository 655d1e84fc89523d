//! Nibble run-length coding (`SP6R`).
//!
//! # Layout
//!
//! ```text
//! "SP6R"  u32 LE raw byte count  (run, nibble) (run, nibble) ...
//! ```
//!
//! The packed stream is expanded into nibbles, high nibble of each byte
//! first, and consecutive equal nibbles are collapsed into records. A run is
//! `1..=255`; longer stretches split into several records. The encoding is
//! lossless and accepts any byte sequence, including the empty one.
//!
//! Worst case is four bytes per input byte (every nibble differs from its
//! neighbour), which is why the selector falls back to raw on noisy images.

use crate::error::RleError;

pub const MAGIC: &[u8; 4] = b"SP6R";

/// Magic plus length prefix.
pub const HEADER_LEN: usize = 8;

/// Longest run a single record can carry.
pub const MAX_RUN: u8 = 255;

fn nibbles(raw: &[u8]) -> impl Iterator<Item = u8> + '_ {
    raw.iter().flat_map(|&b| [b >> 4, b & 0x0F])
}

/// Run-length encode a packed stream.
pub fn encode(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + raw.len() / 2);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(raw.len() as u32).to_le_bytes());

    let mut current: Option<(u8, u8)> = None;
    for nibble in nibbles(raw) {
        current = match current {
            Some((value, run)) if value == nibble && run < MAX_RUN => Some((value, run + 1)),
            Some((value, run)) => {
                out.extend_from_slice(&[run, value]);
                Some((nibble, 1))
            }
            None => Some((nibble, 1)),
        };
    }
    if let Some((value, run)) = current {
        out.extend_from_slice(&[run, value]);
    }
    out
}

/// Number of records in an encoded stream, without decoding it.
pub fn record_count(encoded: &[u8]) -> usize {
    encoded.len().saturating_sub(HEADER_LEN) / 2
}

/// Decode an `SP6R` stream back to the packed bytes.
///
/// # Errors
///
/// Every malformed input is rejected: short header, wrong magic, a dangling
/// half record, a zero-length run, a run value above `0x0F`, and runs that
/// overshoot or fall short of the declared length.
pub fn decode(encoded: &[u8]) -> Result<Vec<u8>, RleError> {
    if encoded.len() < HEADER_LEN {
        return Err(RleError::TruncatedHeader(encoded.len()));
    }
    let (header, body) = encoded.split_at(HEADER_LEN);
    let magic = [header[0], header[1], header[2], header[3]];
    if &magic != MAGIC {
        return Err(RleError::BadMagic(magic));
    }
    let raw_len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
    let expected = raw_len * 2;

    // the header is untrusted; never reserve more than the records can fill
    let mut stream = Vec::with_capacity(expected.min(body.len() / 2 * MAX_RUN as usize));
    let mut records = body.chunks_exact(2);
    for (index, record) in records.by_ref().enumerate() {
        let offset = HEADER_LEN + index * 2;
        let (run, value) = (record[0], record[1]);
        if run == 0 {
            return Err(RleError::ZeroRun(offset));
        }
        if value > 0x0F {
            return Err(RleError::InvalidNibble { offset, value });
        }
        if stream.len() + run as usize > expected {
            return Err(RleError::Overflow { expected });
        }
        stream.extend(std::iter::repeat(value).take(run as usize));
    }
    if !records.remainder().is_empty() {
        return Err(RleError::TruncatedRecord(encoded.len() - 1));
    }
    if stream.len() != expected {
        return Err(RleError::Underflow {
            expected,
            actual: stream.len(),
        });
    }

    Ok(stream.chunks_exact(2).map(|n| (n[0] << 4) | n[1]).collect())
}
