//! Writing converted output to disk.

use serde::Serialize;
use sp6_codec::{Conversion, ConvertOptions};
use std::fmt::Write as _;
use std::path::Path;

use crate::error::ExportError;

/// Default C identifier for exported arrays.
pub const DEFAULT_ARRAY_NAME: &str = "gImage1";

const BYTES_PER_LINE: usize = 16;

/// Which bytes of a conversion end up in the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The packed bitstream, as the firmware stores it.
    Raw,
    /// The selected upload payload.
    Payload,
    /// The packed bitstream as a C array definition.
    CArray,
}

/// Render `data` as a C array definition.
///
/// ```text
/// const unsigned char gImage1[3] = {
/// 0x00, 0x11, 0x13,
/// };
/// ```
pub fn c_array(name: &str, data: &[u8]) -> String {
    let mut out = format!("const unsigned char {name}[{}] = {{\n", data.len());
    for chunk in data.chunks(BYTES_PER_LINE) {
        let line = chunk
            .iter()
            .map(|b| format!("0x{b:02X}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "{line},");
    }
    out.push_str("};\n");
    out
}

/// Bytes to write for `format`.
pub fn render(conversion: &Conversion, format: OutputFormat, array_name: &str) -> Vec<u8> {
    match format {
        OutputFormat::Raw => conversion.raw.clone(),
        OutputFormat::Payload => conversion.payload.clone(),
        OutputFormat::CArray => c_array(array_name, &conversion.raw).into_bytes(),
    }
}

/// Write `bytes` to `path`.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote output");
    Ok(())
}

/// Summary of one conversion, printed with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub panel_size: usize,
    pub quantizer: &'static str,
    pub round_mask: bool,
    pub tone_gain: f32,
    pub format: &'static str,
    pub raw_bytes: usize,
    pub payload_bytes: usize,
    pub rle_bytes: usize,
    pub entropy_bytes: Option<usize>,
    pub ratio: f64,
}

impl ConversionReport {
    pub fn new(conversion: &Conversion, options: &ConvertOptions) -> Self {
        Self {
            panel_size: conversion.quantized.width(),
            quantizer: options.quantizer().name(),
            round_mask: options.is_round(),
            tone_gain: options.gain().green_gain(),
            format: conversion.format.tag(),
            raw_bytes: conversion.raw.len(),
            payload_bytes: conversion.payload.len(),
            rle_bytes: conversion.rle_len,
            entropy_bytes: conversion.entropy_len,
            ratio: conversion.ratio(),
        }
    }
}
