use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sp6_codec::{Conversion, ConvertOptions, PanelSpec};
use sp6_push::compose::{CropParams, QuarterTurn};
use sp6_push::config::{AppConfig, CONFIG_ENV, DEFAULT_CONFIG_FILE, DEVICE_URL_ENV};
use sp6_push::error::AppError;
use sp6_push::export::{self, ConversionReport, OutputFormat, DEFAULT_ARRAY_NAME};
use sp6_push::preview;
use sp6_push::service::ConversionService;
use sp6_push::upload::{prepare_file, UploadEncoding, Uploader};

#[derive(Parser)]
#[command(name = "sp6-push")]
#[command(about = "Convert images for six-color e-paper panels and push them to the device")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an image and write the result to a file
    Convert {
        /// Source image (PNG, JPEG, GIF, BMP or WebP)
        input: PathBuf,

        /// Output file path
        output: PathBuf,

        /// What to write
        #[arg(short, long, value_enum, default_value_t = FormatArg::Raw)]
        format: FormatArg,

        /// C identifier for --format c-array
        #[arg(long, default_value = DEFAULT_ARRAY_NAME)]
        name: String,

        /// Also write a PNG of the quantized image
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Print a JSON summary instead of plain text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        image: ImageArgs,
    },
    /// Upload a converted file to the device
    Upload {
        /// Raw bitstream, or an SP6R / HSK1 payload (sent unchanged)
        file: PathBuf,

        /// Encoding applied to a raw bitstream before sending
        #[arg(short, long, value_enum, default_value_t = EncodingArg::Auto)]
        encoding: EncodingArg,

        /// Device upload URL
        #[arg(long)]
        url: Option<String>,
    },
    /// Convert an image and upload it in one step
    Push {
        /// Source image
        input: PathBuf,

        /// Device upload URL
        #[arg(long)]
        url: Option<String>,

        #[command(flatten)]
        image: ImageArgs,
    },
    /// Decode a converted file and describe it
    Inspect {
        /// Raw bitstream or payload
        file: PathBuf,

        /// Write the decoded image as PNG
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Panel side length (defaults to the configured panel)
        #[arg(long)]
        size: Option<u32>,
    },
}

/// Image framing and conversion options shared by `convert` and `push`.
#[derive(Args)]
struct ImageArgs {
    /// Panel side length in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Quantization mode
    #[arg(long, value_enum)]
    dither: Option<DitherArg>,

    /// Whiten pixels outside the inscribed circle
    #[arg(long)]
    round_mask: bool,

    /// Green channel gain (0 to 4)
    #[arg(long, value_parser = parse_gain)]
    gain: Option<f32>,

    /// Clockwise rotation of the source image: 0, 90, 180 or 270
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    rotate: i32,

    /// Zoom on top of the cover fit
    #[arg(long, default_value_t = 1.0)]
    zoom: f32,

    /// Horizontal shift in panel pixels
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset_x: i32,

    /// Vertical shift in panel pixels
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset_y: i32,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Packed bitstream
    Raw,
    /// Best of raw, RLE and heatshrink
    Payload,
    /// Packed bitstream as a C array
    CArray,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Raw => OutputFormat::Raw,
            FormatArg::Payload => OutputFormat::Payload,
            FormatArg::CArray => OutputFormat::CArray,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DitherArg {
    /// Nearest palette color
    None,
    /// Floyd-Steinberg error diffusion
    Fs,
}

#[derive(Clone, Copy, ValueEnum)]
enum EncodingArg {
    Raw,
    Rle,
    Heatshrink,
    Auto,
}

fn parse_gain(s: &str) -> Result<f32, String> {
    let gain: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if !gain.is_finite() || gain < 0.0 {
        return Err(format!("gain must be a non-negative number, got {s}"));
    }
    Ok(gain)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        run_status_command();
        return Ok(());
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sp6_push=info,sp6_codec=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = AppConfig::load();

    let result = match command {
        Commands::Convert {
            input,
            output,
            format,
            name,
            preview,
            json,
            image,
        } => {
            run_convert_command(
                &config,
                &input,
                &output,
                format.into(),
                &name,
                preview.as_deref(),
                json,
                &image,
            )
            .await
        }
        Commands::Upload {
            file,
            encoding,
            url,
        } => run_upload_command(&config, &file, encoding, url).await,
        Commands::Push { input, url, image } => {
            run_push_command(&config, &input, url, &image).await
        }
        Commands::Inspect { file, output, size } => {
            run_inspect_command(&config, &file, output.as_deref(), size)
        }
    };
    Ok(result?)
}

/// Merge command-line overrides into the loaded config.
fn effective_config(config: &AppConfig, args: &ImageArgs) -> AppConfig {
    let mut config = config.clone();
    if let Some(size) = args.size {
        config.panel_size = size;
    }
    if let Some(dither) = args.dither {
        config.dither = matches!(dither, DitherArg::Fs);
    }
    if args.round_mask {
        config.round_mask = true;
    }
    if let Some(gain) = args.gain {
        config.tone_gain = gain;
    }
    config
}

fn crop_params(args: &ImageArgs) -> Result<CropParams, AppError> {
    Ok(CropParams {
        rotation: QuarterTurn::from_degrees(args.rotate)?,
        zoom: args.zoom,
        offset_x: args.offset_x,
        offset_y: args.offset_y,
    })
}

async fn convert_image(
    config: &AppConfig,
    input: &Path,
    args: &ImageArgs,
) -> Result<(Conversion, ConvertOptions), AppError> {
    let config = effective_config(config, args);
    let crop = crop_params(args)?;
    let options = config.convert_options();
    let service = ConversionService::new(config.converter());

    let conversion = service
        .convert_file(input.to_path_buf(), crop, options)
        .await?;
    Ok((conversion, options))
}

fn read_input(path: &Path) -> Result<Vec<u8>, AppError> {
    std::fs::read(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert an image to a file (no device needed)
#[allow(clippy::too_many_arguments)]
async fn run_convert_command(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    format: OutputFormat,
    name: &str,
    preview_path: Option<&Path>,
    json: bool,
    args: &ImageArgs,
) -> Result<(), AppError> {
    let (conversion, options) = convert_image(config, input, args).await?;

    let bytes = export::render(&conversion, format, name);
    export::write_file(output, &bytes)?;

    if let Some(path) = preview_path {
        let png = preview::encode_png(&conversion.quantized)?;
        export::write_file(path, &png)?;
    }

    let report = ConversionReport::new(&conversion, &options);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Wrote {} ({} bytes, {} payload {}/{} bytes, ratio {:.3})",
            output.display(),
            bytes.len(),
            report.format,
            report.payload_bytes,
            report.raw_bytes,
            report.ratio
        );
    }
    Ok(())
}

/// Upload a previously converted file
async fn run_upload_command(
    config: &AppConfig,
    file: &Path,
    encoding: EncodingArg,
    url: Option<String>,
) -> Result<(), AppError> {
    let bytes = read_input(file)?;
    let encoding = match encoding {
        EncodingArg::Raw => UploadEncoding::Raw,
        EncodingArg::Rle => UploadEncoding::Rle,
        EncodingArg::Heatshrink => UploadEncoding::Heatshrink(config.heatshrink_params()?),
        EncodingArg::Auto => UploadEncoding::Auto(config.heatshrink_params()?),
    };
    let (format, payload) = prepare_file(bytes, encoding, config.panel_spec())?;

    let url = url.unwrap_or_else(|| config.device_url.clone());
    let uploader = Uploader::new(url, config.upload_timeout())?;
    let receipt = uploader.upload(payload).await?;
    println!(
        "Uploaded {} bytes ({format}) to {}: {} {}",
        receipt.bytes,
        uploader.url(),
        receipt.status,
        receipt.body.trim()
    );
    Ok(())
}

/// Convert and upload in one step
async fn run_push_command(
    config: &AppConfig,
    input: &Path,
    url: Option<String>,
    args: &ImageArgs,
) -> Result<(), AppError> {
    let (conversion, _) = convert_image(config, input, args).await?;

    let url = url.unwrap_or_else(|| config.device_url.clone());
    let uploader = Uploader::new(url, config.upload_timeout())?;
    let receipt = uploader.upload(conversion.payload).await?;
    println!(
        "Pushed {} ({} bytes, {}) to {}: {} {}",
        input.display(),
        receipt.bytes,
        conversion.format,
        uploader.url(),
        receipt.status,
        receipt.body.trim()
    );
    Ok(())
}

/// Decode a payload and optionally render it
fn run_inspect_command(
    config: &AppConfig,
    file: &Path,
    output: Option<&Path>,
    size: Option<u32>,
) -> Result<(), AppError> {
    let configured = config.panel_spec();
    let panel = match size {
        Some(size) => PanelSpec::new(size as usize, configured.rotation()),
        None => configured,
    };

    let bytes = read_input(file)?;
    let (format, raw) = preview::decode_payload(&bytes, panel)?;

    println!("File:     {}", file.display());
    println!("Format:   {format}");
    println!("Payload:  {} bytes", bytes.len());
    println!("Raw:      {} bytes", raw.len());
    println!(
        "Panel:    {0}x{0} expects {1} bytes",
        panel.size(),
        panel.packed_len()
    );

    if let Some(path) = output {
        let buffer = preview::render_bitstream(&raw, panel)?;
        export::write_file(path, &preview::encode_png(&buffer)?)?;
        println!("Preview:  {}", path.display());
    }
    Ok(())
}

fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let config_env = std::env::var(CONFIG_ENV).ok();
    let url_env = std::env::var(DEVICE_URL_ENV).ok();

    println!("sp6-push v{VERSION}");
    println!("Six-color e-paper converter and uploader\n");

    println!("Environment Variables:");
    println!(
        "  {CONFIG_ENV}     = {}",
        config_env.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  {DEVICE_URL_ENV} = {}",
        url_env.as_deref().unwrap_or("(not set)")
    );

    let (path, _) = AppConfig::config_path();
    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("built-in defaults ({DEFAULT_CONFIG_FILE} not found)")
    };
    let config = AppConfig::load();

    println!("\nConfiguration:");
    println!("  Source     = {source}");
    println!("  Device URL = {}", config.device_url);
    println!(
        "  Panel      = {0}x{0}, mounted at {1} degrees",
        config.panel_size, config.panel_rotation
    );
    println!(
        "  Quantizer  = {}",
        if config.dither { "floyd-steinberg" } else { "flat" }
    );
    println!("  Round mask = {}", config.round_mask);
    println!("  Tone gain  = {}", config.tone_gain);
    println!(
        "  Heatshrink = window {} / lookahead {}",
        config.heatshrink.window_bits, config.heatshrink.lookahead_bits
    );

    println!("\nCommands:");
    println!("  sp6-push convert <input> <output>  Convert an image to a file");
    println!("  sp6-push upload <file>             Upload a converted file");
    println!("  sp6-push push <input>              Convert and upload");
    println!("  sp6-push inspect <file>            Decode and describe a file");
    println!("  sp6-push --help                    Show all options");
}
