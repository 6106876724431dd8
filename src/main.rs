use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iconforge::encoder::ImageFormat;
use iconforge::icon::SingleIcon;
use iconforge::models::{IconOutputFormat, SynthesisConfig};
use iconforge::rendering::{PngCodec, StandardPngCodec};
use iconforge::synth::IconSynthesizer;
use octree_quant::Bitmap;

#[derive(Parser)]
#[command(name = "iconforge")]
#[command(about = "Synthesize multi-resolution Windows icons from a single image")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an .ico from a PNG with transparency
    Create {
        /// Source PNG (any size, converted to 32-bit ARGB)
        input: PathBuf,

        /// Output .ico file path
        #[arg(short, long)]
        output: PathBuf,

        /// YAML synthesis config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Target formats, e.g. "from-win95" or "vista,winxp" (overrides config)
        #[arg(short, long, value_delimiter = ',')]
        format: Vec<String>,

        /// Disable error diffusion for indexed images
        #[arg(long)]
        no_dither: bool,
    },
    /// List the images inside an .ico
    Info {
        /// Icon file
        icon: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write every image of an .ico as a PNG
    Extract {
        /// Icon file
        icon: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iconforge=warn,octree_quant=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Some(Commands::Create {
            input,
            output,
            config,
            format,
            no_dither,
        }) => run_create_command(&input, &output, config.as_deref(), &format, no_dither),
        Some(Commands::Info { icon, json }) => run_info_command(&icon, json),
        Some(Commands::Extract { icon, output }) => run_extract_command(&icon, &output),
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Synthesize an icon from a PNG
fn run_create_command(
    input: &Path,
    output: &Path,
    config_path: Option<&Path>,
    formats: &[String],
    no_dither: bool,
) -> anyhow::Result<()> {
    let mut config = match config_path {
        Some(path) => SynthesisConfig::load_or_default(path),
        None => SynthesisConfig::default(),
    };
    if !formats.is_empty() {
        config.formats = formats
            .iter()
            .map(|name| name.parse::<IconOutputFormat>())
            .collect::<Result<_, _>>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    if no_dither {
        config.dither = false;
    }

    let codec = StandardPngCodec::new(config.optimize_png);
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let decoded = codec
        .decode(&bytes)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    let source = Bitmap::from_rgba(decoded.width, decoded.height, &decoded.rgba)?;

    let synthesizer = IconSynthesizer::from_config(&config);
    let name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut icon = SingleIcon::new(name);
    icon.create_from(&source, config.output_format(), &synthesizer)?;
    icon.save_with(output, &codec)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    println!(
        "Created {} ({} images, {} bytes)",
        output.display(),
        icon.len(),
        size
    );
    Ok(())
}

#[derive(Serialize)]
struct ImageInfo {
    width: u32,
    height: u32,
    bit_count: u16,
    colors: usize,
    format: ImageFormat,
    bytes: usize,
}

/// Print the directory of an icon
fn run_info_command(path: &Path, json: bool) -> anyhow::Result<()> {
    let codec = StandardPngCodec::default();
    let icon = load_icon(path, &codec)?;

    let images = icon
        .iter()
        .map(|image| {
            Ok(ImageInfo {
                width: image.width(),
                height: image.height(),
                bit_count: image.bit_count(),
                colors: image.colors_in_palette(),
                format: image.format(),
                bytes: image.encoder().image_size(&codec)?,
            })
        })
        .collect::<Result<Vec<_>, iconforge::error::IconError>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&images)?);
        return Ok(());
    }

    println!("{}: {} images\n", path.display(), images.len());
    println!("  {:>9}  {:>4}  {:>6}  {:>6}  {:>8}", "size", "bpp", "colors", "format", "bytes");
    for info in &images {
        println!(
            "  {:>9}  {:>4}  {:>6}  {:>6}  {:>8}",
            format!("{}x{}", info.width, info.height),
            info.bit_count,
            info.colors,
            format!("{:?}", info.format).to_lowercase(),
            info.bytes
        );
    }
    Ok(())
}

/// Write each image as `<stem>-<w>x<h>-<bpp>.png`
fn run_extract_command(path: &Path, output: &Path) -> anyhow::Result<()> {
    let codec = StandardPngCodec::default();
    let icon = load_icon(path, &codec)?;

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "icon".to_string());

    for image in &icon {
        let png = codec.encode(&image.to_rgba()?, image.width(), image.height())?;
        let file = output.join(format!(
            "{stem}-{}x{}-{}.png",
            image.width(),
            image.height(),
            image.bit_count()
        ));
        std::fs::write(&file, &png)
            .with_context(|| format!("Failed to write {}", file.display()))?;
        println!("  + {}", file.display());
    }
    println!("Extracted {} images", icon.len());
    Ok(())
}

fn load_icon(path: &Path, codec: &dyn PngCodec) -> anyhow::Result<SingleIcon> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut icon = SingleIcon::new(name);
    icon.load_with(path, codec)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(icon)
}

/// Display version and usage
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("Iconforge v{VERSION}");
    println!("Multi-resolution Windows icon synthesis\n");

    println!("Formats:");
    for name in [
        "vista",
        "winxp",
        "winxp-unpopular",
        "win95",
        "win95-unpopular",
        "win31",
        "win31-unpopular",
        "win30",
        "from-winxp",
        "from-win95 (default)",
        "from-win31",
        "from-win30",
        "all",
    ] {
        println!("  {name}");
    }

    println!("\nCommands:");
    println!("  iconforge create    Build an .ico from a PNG");
    println!("  iconforge info      List the images inside an .ico");
    println!("  iconforge extract   Write every image of an .ico as PNG");
    println!("\nRun 'iconforge --help' for more details.");
}
