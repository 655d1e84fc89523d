//! PNG previews of quantized buffers and device payloads.
//!
//! Previews are written as 4-bit indexed PNGs whose palette is the panel's
//! six colors, so what you see is exactly what the panel can show. Index `i`
//! in the PNG is `PALETTE[i]`, not the device code.

use sp6_codec::compress::{entropy, rle};
use sp6_codec::pack::{codes_to_buffer, unpack};
use sp6_codec::palette::{by_code, nearest, PALETTE};
use sp6_codec::{PanelSpec, PayloadFormat, PixelBuffer};
use std::io::Cursor;

use crate::error::PreviewError;

/// Guess a payload's encoding from its magic bytes.
///
/// Raw bitstreams are not self-describing and may happen to start with a
/// magic; [`decode_payload`] resolves that case.
pub fn detect_format(bytes: &[u8]) -> PayloadFormat {
    if bytes.starts_with(rle::MAGIC) {
        PayloadFormat::Rle
    } else if bytes.starts_with(entropy::MAGIC) {
        PayloadFormat::Entropy
    } else {
        PayloadFormat::Raw
    }
}

/// Decode any payload back to the packed bitstream for `panel`.
///
/// A stream that carries a magic but does not decode is taken as raw when it
/// has exactly the panel's packed length and every nibble is a palette code.
pub fn decode_payload(
    bytes: &[u8],
    panel: PanelSpec,
) -> Result<(PayloadFormat, Vec<u8>), PreviewError> {
    let format = detect_format(bytes);
    let decoded: Result<Vec<u8>, PreviewError> = match format {
        PayloadFormat::Rle => rle::decode(bytes).map_err(Into::into),
        PayloadFormat::Entropy => entropy::decompress(bytes).map_err(Into::into),
        PayloadFormat::Raw => Ok(bytes.to_vec()),
    };

    let (format, raw) = match decoded {
        Ok(raw) => (format, raw),
        Err(e) if is_plausible_raw(bytes, panel) => {
            tracing::debug!(%e, magic = format.tag(), "Magic does not decode, treating as raw");
            (PayloadFormat::Raw, bytes.to_vec())
        }
        Err(e) => return Err(e),
    };
    tracing::debug!(format = format.tag(), raw = raw.len(), "Decoded payload");
    Ok((format, raw))
}

fn is_plausible_raw(bytes: &[u8], panel: PanelSpec) -> bool {
    bytes.len() == panel.packed_len()
        && bytes
            .iter()
            .all(|&b| by_code(b >> 4).is_some() && by_code(b & 0x0F).is_some())
}

/// Rebuild the source-oriented image a packed bitstream encodes.
pub fn render_bitstream(raw: &[u8], panel: PanelSpec) -> Result<PixelBuffer, PreviewError> {
    let side = panel.size();
    let codes = unpack(raw, side, side, panel.rotation())?;
    Ok(codes_to_buffer(&codes, side, side)?)
}

/// Encode a buffer as a 4-bit indexed PNG over the panel palette.
///
/// Pixels that are not palette colors are mapped to their nearest entry.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, PreviewError> {
    let (width, height) = (buffer.width() as u32, buffer.height() as u32);
    let plte: Vec<u8> = PALETTE
        .iter()
        .flat_map(|e| [e.color.r, e.color.g, e.color.b])
        .collect();
    let rows = pack_rows(&palette_indices(buffer), buffer.width());

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Four);
        encoder.set_palette(plte);
        let mut writer = encoder
            .write_header()
            .map_err(|e| PreviewError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(&rows)
            .map_err(|e| PreviewError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Position in [`PALETTE`] of each pixel's nearest color.
fn palette_indices(buffer: &PixelBuffer) -> Vec<u8> {
    buffer
        .pixels()
        .iter()
        .map(|&c| {
            let code = nearest(c).code;
            PALETTE.iter().position(|e| e.code == code).unwrap_or(0) as u8
        })
        .collect()
}

/// Two indices per byte, high nibble first, each row padded to a byte.
fn pack_rows(indices: &[u8], width: usize) -> Vec<u8> {
    let bytes_per_row = width.div_ceil(2);
    let mut packed = Vec::with_capacity(bytes_per_row * indices.len() / width.max(1));
    for row in indices.chunks(width.max(1)) {
        for pair in row.chunks(2) {
            let low = pair.get(1).copied().unwrap_or(0);
            packed.push((pair[0] << 4) | (low & 0x0F));
        }
    }
    packed
}
