use clap::{Parser, Subcommand};
use snapfit::output::{self, CompressReport};
use snapfit::pipeline::{self, AttemptEvent, InputImage, PipelineConfig};
use snapfit::validate::subtype_of;
use snapfit::{config, encoder::RustEncoder};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

#[derive(Parser)]
#[command(name = "snapfit")]
#[command(version)]
#[command(about = "Compress an image to fit a byte budget")]
#[command(long_about = "\
Compress an image to fit a byte budget

Walks a fixed, ordered table of compression levels — each a size ceiling,
a maximum long-edge dimension, and a JPEG quality — and stops at the first
level whose output fits. Inputs already below the no-op threshold pass
through untouched. If no level fits, the final achieved size is reported.

Stock levels:

  standard     4500000 byte ceiling   1920px   quality 0.80
  aggressive   2000000 byte ceiling   1280px   quality 0.60
  maximum      1000000 byte ceiling   1000px   quality 0.45

Run 'snapfit gen-config' to print a documented snapfit.toml.")]
struct Cli {
    /// Config file (defaults used when absent)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress an image file to fit the configured budget
    Compress {
        /// Input image file
        input: PathBuf,
        /// Output file for the compressed artifact
        #[arg(short, long)]
        output: PathBuf,
        /// Declared media subtype (defaults to the file extension)
        #[arg(long = "type")]
        media_type: Option<String>,
        /// Emit a machine-readable JSON report instead of progress lines
        #[arg(long)]
        json: bool,
    },
    /// Validate an input file's format without compressing
    Check {
        input: PathBuf,
        #[arg(long = "type")]
        media_type: Option<String>,
    },
    /// Print a stock snapfit.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_pipeline_config(cli.config.as_deref())?;

    match cli.command {
        Command::Compress {
            input,
            output,
            media_type,
            json,
        } => {
            let bytes = std::fs::read(&input)?;
            let subtype = declared_subtype(&input, media_type.as_deref())?;
            let image = InputImage::new(&bytes, &subtype);

            // Stream attempt events to a printer thread so progress shows
            // while an encode is still running.
            let (tx, rx) = mpsc::channel::<AttemptEvent>();
            let quiet = json;
            let printer = std::thread::spawn(move || {
                let mut events = Vec::new();
                for event in rx {
                    if !quiet {
                        println!("{}", output::format_attempt_event(&event));
                    }
                    events.push(event);
                }
                events
            });

            let encoder = RustEncoder::new();
            let result = pipeline::run_with_encoder(&encoder, image, &config, Some(&tx), None);
            drop(tx);
            let events = printer.join().expect("printer thread panicked");

            let artifact = result?;
            std::fs::write(&output, &artifact.bytes)?;

            if json {
                let report = CompressReport::new(bytes.len() as u64, &artifact, &events);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for line in output::format_success(bytes.len() as u64, &artifact) {
                    println!("{line}");
                }
                println!("wrote {}", output.display());
            }
        }
        Command::Check { input, media_type } => {
            let subtype = declared_subtype(&input, media_type.as_deref())?;
            snapfit::validate::validate(&subtype, &config.allow)?;
            println!("{}: format \"{subtype}\" accepted", input.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_pipeline_config(
    path: Option<&Path>,
) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => config::FileConfig::load(path)?.into_pipeline_config(),
        None => PipelineConfig::default(),
    })
}

/// Resolve the declared subtype: an explicit --type wins (with or without
/// the `image/` prefix), otherwise the lowercased file extension.
fn declared_subtype(
    input: &Path,
    explicit: Option<&str>,
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(t) = explicit {
        return Ok(subtype_of(t).to_lowercase());
    }
    input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| format!("cannot infer media type of {}; pass --type", input.display()).into())
}
