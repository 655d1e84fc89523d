//! HTTP delivery of payloads to the device.
//!
//! The device accepts a single `POST` with an `application/octet-stream`
//! body and answers with a short plain-text status. Anything outside 2xx is
//! an error carrying the device's message.

use sp6_codec::compress::{entropy, rle, select};
use sp6_codec::{HeatshrinkEngine, HeatshrinkParams, PanelSpec, PayloadFormat};
use std::time::Duration;

use crate::error::{PreviewError, UploadError};
use crate::preview::decode_payload;

/// How a raw bitstream file is encoded before upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEncoding {
    Raw,
    Rle,
    Heatshrink(HeatshrinkParams),
    /// Shortest of the three.
    Auto(HeatshrinkParams),
}

/// Encode a raw bitstream for upload.
pub fn prepare_payload(raw: &[u8], encoding: UploadEncoding) -> (PayloadFormat, Vec<u8>) {
    match encoding {
        UploadEncoding::Raw => (PayloadFormat::Raw, raw.to_vec()),
        UploadEncoding::Rle => (PayloadFormat::Rle, rle::encode(raw)),
        UploadEncoding::Heatshrink(params) => {
            let engine = HeatshrinkEngine::new(params);
            // the in-process engine always produces output
            match entropy::compress(&engine, raw) {
                Some(payload) => (PayloadFormat::Entropy, payload),
                None => (PayloadFormat::Raw, raw.to_vec()),
            }
        }
        UploadEncoding::Auto(params) => {
            let rle = rle::encode(raw);
            let hsk = entropy::compress(&HeatshrinkEngine::new(params), raw);
            let chosen = select(raw, &rle, hsk.as_deref());
            (chosen.format, chosen.payload.to_vec())
        }
    }
}

/// Payload for a file read from disk.
///
/// An `SP6R` or `HSK1` stream that decodes is sent unchanged. Anything else
/// is a raw bitstream and is encoded with `encoding`. The device rejects
/// bodies of the wrong length, so a raw stream that does not fit `panel` is
/// only warned about.
pub fn prepare_file(
    bytes: Vec<u8>,
    encoding: UploadEncoding,
    panel: PanelSpec,
) -> Result<(PayloadFormat, Vec<u8>), PreviewError> {
    let (format, raw) = decode_payload(&bytes, panel)?;
    if format != PayloadFormat::Raw {
        return Ok((format, bytes));
    }

    let expected = panel.packed_len();
    if raw.len() != expected {
        tracing::warn!(
            actual = raw.len(),
            expected,
            "Bitstream length does not match the configured panel"
        );
    }
    Ok(prepare_payload(&raw, encoding))
}

/// Device response to a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub status: u16,
    pub bytes: usize,
    pub body: String,
}

/// Posts payloads to a fixed device URL.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: reqwest::Client,
    url: String,
}

impl Uploader {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `payload` to the device.
    pub async fn upload(&self, payload: Vec<u8>) -> Result<UploadReceipt, UploadError> {
        let bytes = payload.len();
        tracing::debug!(url = %self.url, bytes, "Uploading payload");

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %body.trim(), "Device rejected upload");
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(url = %self.url, bytes, status = status.as_u16(), "Upload complete");
        Ok(UploadReceipt {
            status: status.as_u16(),
            bytes,
            body,
        })
    }
}
