//! `cellsnap` CLI - check table-cell annotation documents

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use cellsnap::EditorConfig;
use cellsnap::domain::{Annotation, AnnotationData};
use cellsnap::report::Report;

#[derive(Parser)]
#[command(name = "cellsnap")]
#[command(about = "Table-cell annotation checker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report overlaps, border conflicts and misaligned or out-of-image cells
    Check {
        /// Annotation JSON document
        file: PathBuf,

        /// Document image, enables the out-of-image check
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Snap distance used to find near-miss edges (px)
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Max distance between edges treated as the same border (px)
        #[arg(short, long)]
        align_tolerance: Option<f32>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            file,
            image,
            threshold,
            align_tolerance,
            json,
        } => {
            let mut config = EditorConfig::load();
            if let Some(threshold) = threshold {
                config.snap_enabled = true;
                config.snap_threshold = threshold;
            }
            if let Some(tolerance) = align_tolerance {
                config.border_align_tolerance = tolerance;
            }
            let report = cmd_check(&file, image.as_deref(), &config.sanitized())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
            Ok(if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn cmd_check(file: &Path, image: Option<&Path>, config: &EditorConfig) -> Result<Report> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let data = AnnotationData::from_json(&text)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    let annotation = Annotation::from_data(&data)
        .with_context(|| format!("Invalid annotation in {}", file.display()))?;

    let image_size = match image {
        Some(path) => {
            let (w, h) = image::image_dimensions(path)
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            log::debug!("image {} is {w}x{h}", path.display());
            Some((w as f32, h as f32))
        }
        None => None,
    };

    Ok(Report::build(&annotation, config, image_size))
}
