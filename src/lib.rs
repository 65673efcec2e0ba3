//! Potholekit: turn pothole detection annotations into a classification corpus.
//!
//! A dataset root holds `images/` and either `annotations/` (Pascal VOC XML,
//! COCO JSON or YOLO TXT) or one or more CSV files. Potholekit parses the
//! annotations into an [`ir::AnnotationMap`], reports statistics on it, and
//! writes fixed-size `pothole/` and `no_pothole/` crops for an image
//! classifier.
//!
//! # Modules
//!
//! - [`ir`]: Bounding boxes, the annotation map and the format readers
//! - [`sample`]: Background (negative) region sampling
//! - [`build`]: Classification corpus builder
//! - [`stats`]: Dataset statistics
//! - [`config`]: Pipeline configuration
//! - [`error`]: Error types for potholekit operations

pub mod build;
pub mod config;
pub mod error;
pub mod ir;
pub mod sample;
pub mod stats;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

use build::{build_dataset_seeded, BuildOptions, BuildReport};
use config::{parse_output_size, parse_threshold, ConfigOverrides, PipelineConfig};
use ir::{AnnotationMap, DatasetLayout};

pub use error::PotholeError;

/// Public page of the annotated potholes dataset.
pub const DATASET_URL: &str = "https://www.kaggle.com/datasets/chitholian/annotated-potholes-dataset";
/// Kaggle identifier of the annotated potholes dataset.
pub const DATASET_ID: &str = "chitholian/annotated-potholes-dataset";

/// The potholekit CLI application.
#[derive(Parser)]
#[command(name = "potholekit")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print statistics of a dataset's annotations.
    Analyze(AnalyzeArgs),
    /// Write the pothole / no_pothole classification corpus.
    Build(BuildArgs),
    /// Write a dataset's annotations as unified JSON.
    Export(ExportArgs),
    /// Parse, analyze and build in one go.
    Run(RunArgs),
}

/// Report rendering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Where annotations come from.
#[derive(clap::Args)]
struct SourceArgs {
    /// Dataset root containing `images/` and `annotations/` or CSV files.
    root: PathBuf,

    /// Read annotations from a unified JSON file instead of the dataset root.
    #[arg(long, value_name = "FILE")]
    annotations: Option<PathBuf>,
}

/// Corpus settings shared by `build` and `run`.
#[derive(clap::Args)]
struct ConfigArgs {
    /// YAML configuration file; flags below override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output image size as WIDTHxHEIGHT.
    #[arg(long, value_name = "WxH", value_parser = parse_output_size)]
    size: Option<[u32; 2]>,

    /// Maximum fraction of a negative sample a pothole may cover.
    #[arg(long, value_parser = parse_threshold)]
    threshold: Option<f64>,

    /// Seed for negative sampling.
    #[arg(long)]
    seed: Option<u64>,

    /// Corpus directory (default: <root>/processed/classification).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<PipelineConfig, PotholeError> {
        PipelineConfig::resolve(
            self.config.as_deref(),
            ConfigOverrides {
                output_size: self.size,
                overlap_threshold: self.threshold,
                seed: self.seed,
                output_dir: self.output_dir.clone(),
            },
        )
    }
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output format for the report.
    #[arg(long, value_enum, default_value = "text")]
    output: ReportFormat,
}

#[derive(clap::Args)]
struct BuildArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    config: ConfigArgs,

    /// Output format for the report.
    #[arg(long, value_enum, default_value = "text")]
    output: ReportFormat,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Dataset root containing `annotations/` or CSV files.
    root: PathBuf,

    /// Destination JSON file.
    #[arg(long, value_name = "FILE")]
    out: PathBuf,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Dataset root containing `images/` and `annotations/` or CSV files.
    root: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

/// Run the potholekit CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PotholeError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Analyze(args)) => run_analyze(args),
        Some(Commands::Build(args)) => run_build(args),
        Some(Commands::Export(args)) => run_export(args),
        Some(Commands::Run(args)) => run_pipeline(args),
        None => {
            println!("potholekit {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Turn pothole detection annotations into a classification corpus.");
            println!();
            println!("Run 'potholekit --help' for usage information.");
            Ok(())
        }
    }
}

fn load_map(source: &SourceArgs) -> Result<AnnotationMap, PotholeError> {
    match &source.annotations {
        Some(path) => ir::io_json::read_annotation_json(path),
        None => ir::read_annotations(&DatasetLayout::new(&source.root)),
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), PotholeError> {
    let map = load_map(&args.source)?;
    let stats = stats::analyze(&map)?;

    match args.output {
        ReportFormat::Json => print_json(&stats),
        ReportFormat::Text => {
            print!("{}", stats);
            Ok(())
        }
    }
}

fn run_build(args: BuildArgs) -> Result<(), PotholeError> {
    let config = args.config.resolve()?;
    let layout = DatasetLayout::new(&args.source.root);
    require_images_dir(&layout)?;

    let map = load_map(&args.source)?;
    let report = build_corpus(&map, &layout, &config)?;

    match args.output {
        ReportFormat::Json => print_json(&report),
        ReportFormat::Text => {
            print!("{}", report);
            Ok(())
        }
    }
}

fn run_export(args: ExportArgs) -> Result<(), PotholeError> {
    let map = ir::read_annotations(&DatasetLayout::new(&args.root))?;
    ir::io_json::write_annotation_json(&args.out, &map)?;

    println!(
        "✓ Exported {} annotations for {} images to {}",
        map.annotation_count(),
        map.image_count(),
        args.out.display()
    );
    Ok(())
}

fn run_pipeline(args: RunArgs) -> Result<(), PotholeError> {
    let config = args.config.resolve()?;
    let layout = DatasetLayout::new(&args.root);

    if !layout.images_dir.is_dir() {
        println!("Dataset not found!");
        print!("{}", download_instructions(&layout.root));
        return Ok(());
    }

    info!("loading pothole dataset from {}", layout.root.display());
    let map = ir::read_annotations(&layout)?;

    let stats = stats::analyze(&map)?;
    print!("{}", stats);
    println!();

    let report = build_corpus(&map, &layout, &config)?;
    print!("{}", report);
    Ok(())
}

fn build_corpus(
    map: &AnnotationMap,
    layout: &DatasetLayout,
    config: &PipelineConfig,
) -> Result<BuildReport, PotholeError> {
    let mut opts = BuildOptions::new(
        config.classification_dir(layout),
        config.output_width(),
        config.output_height(),
    );
    opts.overlap_threshold = config.overlap_threshold;

    build_dataset_seeded(map, &layout.images_dir, &opts, config.seed)
}

fn require_images_dir(layout: &DatasetLayout) -> Result<(), PotholeError> {
    if layout.images_dir.is_dir() {
        Ok(())
    } else {
        Err(PotholeError::ImagesDirMissing {
            path: layout.images_dir.clone(),
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), PotholeError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| PotholeError::JsonWrite {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    println!("{}", json);
    Ok(())
}

/// How to fetch the dataset into `root`.
pub fn download_instructions(root: &Path) -> String {
    let root = root.display();
    format!(
        "To download the annotated potholes dataset:\n\
         1. Go to: {DATASET_URL}\n\
         2. Click 'Download'\n\
         3. Extract the downloaded zip file to: {root}\n\
         4. Make sure the structure looks like:\n   \
            {root}/\n   \
            ├── images/\n   \
            └── annotations/\n\
         \n\
         Alternatively, use the Kaggle CLI:\n\
         kaggle datasets download -d {DATASET_ID} -p {root} --unzip\n"
    )
}
