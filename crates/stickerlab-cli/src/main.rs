//! Stickerlab CLI: run the transformation pipeline against local files.
//!
//! Set GEMINI_API_KEY for live mode; without it the pipeline runs its local
//! demo simulation. See PipelineConfig for the other STICKERLAB_* variables.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use stickerlab_core::{FallbackTier, MediaAsset, PipelineConfig, Resolution, TransformResult};
use stickerlab_pipeline::TransformPipeline;
use stickerlab_processing::codec;

#[derive(Parser)]
#[command(name = "stickerlab", about = "Sticker transformation pipeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove caption text and watermarks from an image or animated GIF
    RemoveText {
        /// Path to the source image
        input: PathBuf,
        /// Output PNG path
        #[arg(short, long, default_value = "sticker.png")]
        output: PathBuf,
        /// Declared MIME type; guessed from the extension when omitted
        #[arg(long)]
        mime: Option<String>,
    },
    /// Generate a sticker from a prompt
    Generate {
        /// The generation prompt
        prompt: String,
        /// Output resolution: low/mid/high (1K/2K/4K)
        #[arg(long, default_value = "low")]
        resolution: Resolution,
        /// Output PNG path
        #[arg(short, long, default_value = "sticker.png")]
        output: PathBuf,
    },
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn guess_mime(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "gif" => "image/gif",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
    .to_string()
}

fn write_result(result: &TransformResult, output: &Path) -> anyhow::Result<()> {
    let png = codec::encode_png(&result.raster).context("encoding output PNG")?;
    std::fs::write(output, png)
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "wrote {} ({}x{}, mode {:?}, tier {:?})",
        output.display(),
        result.raster.width(),
        result.raster.height(),
        result.mode,
        result.tier,
    );
    if result.tier == FallbackTier::Passthrough {
        eprintln!("warning: transparency was not achieved; the output background is opaque");
    }
    if result.representative_frame {
        eprintln!("note: animated input; only the first frame was transformed");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env();
    let pipeline = TransformPipeline::from_config(&config);

    let outcome = match cli.command {
        Commands::RemoveText {
            input,
            output,
            mime,
        } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let mime = mime.unwrap_or_else(|| guess_mime(&input));
            let asset = MediaAsset::new(bytes, mime)?;
            pipeline
                .remove_text(asset)
                .await
                .map(|result| (result, output))
        }
        Commands::Generate {
            prompt,
            resolution,
            output,
        } => pipeline
            .generate_from_prompt(&prompt, resolution)
            .await
            .map(|result| (result, output)),
    };

    match outcome {
        Ok((result, output)) => write_result(&result, &output),
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}
