//! Output file tests.

mod common;

use common::{colors, test_converter, test_panel, write_solid_png, PANEL_SIZE};
use sp6_codec::ConvertOptions;
use sp6_push::compose::CropParams;
use sp6_push::export::{render, write_file, ConversionReport, OutputFormat, DEFAULT_ARRAY_NAME};
use sp6_push::preview;
use sp6_push::service::ConversionService;

async fn convert_white(options: ConvertOptions) -> sp6_codec::Conversion {
    let dir = tempfile::tempdir().unwrap();
    let input = write_solid_png(dir.path(), "white.png", PANEL_SIZE, PANEL_SIZE, colors::WHITE);
    ConversionService::new(test_converter())
        .convert_file(input, CropParams::default(), options)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_raw_output_round_trips_through_file() {
    let conversion = convert_white(ConvertOptions::new()).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.sp6");

    write_file(&path, &render(&conversion, OutputFormat::Raw, DEFAULT_ARRAY_NAME)).unwrap();
    let bytes = std::fs::read(&path).unwrap();

    assert_eq!(bytes.len(), 512);
    assert!(bytes.iter().all(|&b| b == 0x11));
}

#[tokio::test]
async fn test_payload_output_is_selected_encoding() {
    let conversion = convert_white(ConvertOptions::new()).await;
    let bytes = render(&conversion, OutputFormat::Payload, DEFAULT_ARRAY_NAME);

    assert_eq!(preview::detect_format(&bytes), conversion.format);
    let (_, raw) = preview::decode_payload(&bytes, test_panel()).unwrap();
    assert_eq!(raw, conversion.raw);
}

#[tokio::test]
async fn test_c_array_output_declares_raw_length() {
    let conversion = convert_white(ConvertOptions::new()).await;
    let text = String::from_utf8(render(&conversion, OutputFormat::CArray, "panel")).unwrap();

    assert!(text.starts_with("const unsigned char panel[512] = {\n0x11, 0x11,"));
    assert!(text.ends_with("};\n"));
    // 512 bytes, 16 per line
    assert_eq!(text.lines().count(), 32 + 2);
}

#[tokio::test]
async fn test_report_serializes_conversion_summary() {
    let options = ConvertOptions::new().dither(true).tone_gain(1.5);
    let conversion = convert_white(options).await;
    let report = serde_json::to_value(ConversionReport::new(&conversion, &options)).unwrap();

    assert_eq!(report["panel_size"], 32);
    assert_eq!(report["quantizer"], "floyd-steinberg");
    assert_eq!(report["tone_gain"], 1.5);
    assert_eq!(report["raw_bytes"], 512);
    assert_eq!(report["format"], conversion.format.tag());
    assert_eq!(report["payload_bytes"], conversion.payload.len());
}

#[tokio::test]
async fn test_preview_png_has_panel_dimensions() {
    let conversion = convert_white(ConvertOptions::new()).await;
    let png = preview::encode_png(&conversion.quantized).unwrap();

    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (PANEL_SIZE, PANEL_SIZE));
    assert_eq!(img.to_rgba8().get_pixel(5, 5).0, [255, 255, 255, 255]);
}
