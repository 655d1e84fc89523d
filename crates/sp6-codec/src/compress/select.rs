//! Best-of-N payload selection.

/// Encoding of the payload sent to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadFormat {
    /// `HSK1` heatshrink frame.
    Entropy,
    /// `SP6R` run-length stream.
    Rle,
    /// Bare packed bitstream.
    Raw,
}

impl PayloadFormat {
    /// Short name used in logs and reports.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Entropy => "heatshrink",
            Self::Rle => "rle",
            Self::Raw => "raw",
        }
    }
}

impl std::fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// The chosen payload, borrowed from its candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub format: PayloadFormat,
    pub payload: &'a [u8],
}

/// Pick the shortest candidate that is strictly smaller than `raw`.
///
/// Equal lengths resolve in the order entropy, RLE, raw. When no candidate
/// beats the raw length the raw stream is returned, so the result is never
/// longer than `raw`.
pub fn select<'a>(raw: &'a [u8], rle: &'a [u8], entropy: Option<&'a [u8]>) -> Selection<'a> {
    let mut best = Selection {
        format: PayloadFormat::Raw,
        payload: raw,
    };
    let candidates = [
        entropy.map(|payload| (PayloadFormat::Entropy, payload)),
        Some((PayloadFormat::Rle, rle)),
    ];
    for (format, payload) in candidates.into_iter().flatten() {
        // strict: an earlier candidate keeps a tie
        if payload.len() < best.payload.len() {
            best = Selection { format, payload };
        }
    }
    best
}
