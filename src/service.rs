//! Async front for the CPU-bound conversion.

use sp6_codec::{Conversion, ConvertOptions, Converter, PixelBuffer};
use std::path::PathBuf;
use std::sync::Arc;

use crate::compose::{compose, load_image, CropParams};
use crate::error::AppError;

/// Runs conversions off the async runtime.
///
/// Each call moves its inputs into a blocking task, so an upload awaiting
/// the network never shares buffers with a conversion in flight.
#[derive(Clone)]
pub struct ConversionService {
    converter: Arc<Converter>,
}

impl ConversionService {
    pub fn new(converter: Converter) -> Self {
        Self {
            converter: Arc::new(converter),
        }
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Convert a ready buffer.
    pub async fn convert(
        &self,
        buffer: PixelBuffer,
        options: ConvertOptions,
    ) -> Result<Conversion, AppError> {
        let converter = self.converter.clone();
        tokio::task::spawn_blocking(move || converter.convert(buffer, &options))
            .await
            .map_err(|e| AppError::Task(e.to_string()))?
            .map_err(AppError::from)
    }

    /// Load, compose and convert an image file.
    pub async fn convert_file(
        &self,
        path: PathBuf,
        crop: CropParams,
        options: ConvertOptions,
    ) -> Result<Conversion, AppError> {
        let converter = self.converter.clone();
        tokio::task::spawn_blocking(move || -> Result<Conversion, AppError> {
            let img = load_image(&path)?;
            let side = converter.panel().size() as u32;
            let buffer = compose(&img, side, &crop)?;
            Ok(converter.convert(buffer, &options)?)
        })
        .await
        .map_err(|e| AppError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp6_codec::{Color, PanelRotation, PanelSpec, PayloadFormat};

    fn service(size: usize) -> ConversionService {
        ConversionService::new(Converter::with_heatshrink(
            PanelSpec::new(size, PanelRotation::Inverted),
            10,
            4,
        ))
    }

    #[tokio::test]
    async fn test_convert_runs_pipeline() {
        let conversion = service(16)
            .convert(PixelBuffer::filled(16, 16, Color::WHITE), ConvertOptions::new())
            .await
            .unwrap();
        assert_eq!(conversion.raw.len(), 128);
        assert_ne!(conversion.format, PayloadFormat::Raw);
    }

    #[tokio::test]
    async fn test_convert_reports_dimension_errors() {
        let err = service(16)
            .convert(PixelBuffer::filled(8, 8, Color::WHITE), ConvertOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Codec(_)));
    }

    #[tokio::test]
    async fn test_convert_file_reports_missing_input() {
        let err = service(16)
            .convert_file(
                PathBuf::from("/nonexistent/input.png"),
                CropParams::default(),
                ConvertOptions::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Compose(_)));
    }
}
