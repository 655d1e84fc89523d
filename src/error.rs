use std::path::PathBuf;

use sp6_codec::{CodecError, EntropyError, HeatshrinkError, RleError};
use thiserror::Error;

/// Top-level error for the conversion and upload workflow.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Compose error: {0}")]
    Compose(#[from] ComposeError),

    #[error("Conversion error: {0}")]
    Codec(#[from] CodecError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Preview error: {0}")]
    Preview(#[from] PreviewError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] HeatshrinkError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("Conversion task failed: {0}")]
    Task(String),
}

/// Errors while turning a source image into a panel-sized buffer.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Unsupported rotation: {0} degrees (expected 0, 90, 180 or 270)")]
    Rotation(i32),

    #[error("Invalid zoom factor: {0}")]
    Zoom(f32),

    #[error("Image has no pixels")]
    Empty,

    #[error("Buffer error: {0}")]
    Buffer(#[from] CodecError),
}

/// Errors while delivering a payload to the device.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Device rejected upload with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors while writing converted output to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors while decoding a payload back into an image.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("RLE payload error: {0}")]
    Rle(#[from] RleError),

    #[error("Heatshrink payload error: {0}")]
    Entropy(#[from] EntropyError),

    #[error("Bitstream error: {0}")]
    Codec(#[from] CodecError),

    #[error("PNG encode error: {0}")]
    PngEncode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_error_rotation() {
        let error = ComposeError::Rotation(45);
        assert_eq!(
            error.to_string(),
            "Unsupported rotation: 45 degrees (expected 0, 90, 180 or 270)"
        );
    }

    #[test]
    fn test_compose_error_read_names_path() {
        let error = ComposeError::Read {
            path: PathBuf::from("missing.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(error.to_string(), "Failed to read missing.png: not found");
    }

    #[test]
    fn test_upload_error_status() {
        let error = UploadError::Status {
            status: 400,
            body: "Invalid content length".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Device rejected upload with status 400: Invalid content length"
        );
    }

    #[test]
    fn test_preview_error_png() {
        let error = PreviewError::PngEncode("bad depth".to_string());
        assert_eq!(error.to_string(), "PNG encode error: bad depth");
    }

    #[test]
    fn test_app_error_from_codec_error() {
        let codec = CodecError::InvalidDimensions {
            width: 10,
            height: 12,
            expected: 400,
        };
        let app: AppError = codec.into();
        assert!(matches!(app, AppError::Codec(_)));
        assert_eq!(
            app.to_string(),
            "Conversion error: invalid dimensions: 10x12 (panel expects 400x400)"
        );
    }

    #[test]
    fn test_app_error_from_preview_error() {
        let preview = PreviewError::Rle(RleError::TruncatedHeader(2));
        let app: AppError = preview.into();
        match app {
            AppError::Preview(_) => {}
            _ => panic!("Expected Preview variant"),
        }
    }

    #[test]
    fn test_app_error_from_heatshrink_error() {
        let app: AppError = HeatshrinkError::WindowBits(20).into();
        assert!(matches!(app, AppError::Config(_)));
        assert!(app.to_string().starts_with("Invalid configuration: "));
    }
}
