//! Command-line parsing for the limb-bud stager.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the staging/math code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::descriptors::ExtractorParams;
use crate::domain::NameParser;
use crate::math::SplineOptions;
use crate::staging::TABLE_RESOLUTION;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "limbstage", version, about = "Mouse limb-bud age staging from digitized outlines")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stage one record: extract descriptors, match the calibration, print the age.
    Stage(StageArgs),
    /// Print the descriptor vector of one record (no calibration needed).
    Descriptors(DescriptorsArgs),
    /// Stage every `.txt` record in a directory and compare with nominal ages.
    Batch(BatchArgs),
    /// Write a synthetic lobed outline record.
    Synth(SynthArgs),
    /// Write the densified Welsh calibration table.
    Table(TableArgs),
}

/// Extraction tunables shared by the subcommands that extract descriptors.
///
/// The calibration curve was built with the defaults.
#[derive(Debug, Args, Clone)]
pub struct ExtractorArgs {
    /// Number of points the outline is resampled to.
    #[arg(long, default_value_t = 200)]
    pub resample: usize,

    /// Spline smoothing (0 interpolates the digitized points).
    #[arg(long, default_value_t = 0.0)]
    pub smoothing: f64,

    /// Peaks kept per refinement round.
    #[arg(long, default_value_t = 5)]
    pub peaks: usize,

    /// Valleys kept per refinement round.
    #[arg(long, default_value_t = 6)]
    pub valleys: usize,

    /// Minimum separation between extrema, in resampled points.
    #[arg(long, default_value_t = 20)]
    pub separation: usize,
}

impl ExtractorArgs {
    pub fn to_params(&self) -> ExtractorParams {
        ExtractorParams {
            spline: SplineOptions {
                count: self.resample,
                smoothing: self.smoothing,
                ..SplineOptions::default()
            },
            peak_count: self.peaks,
            valley_count: self.valleys,
            min_separation: self.separation,
            ..ExtractorParams::default()
        }
    }
}

/// Options for staging a single record.
#[derive(Debug, Args, Clone)]
pub struct StageArgs {
    /// Record file with `MEASURED x y` lines.
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,

    /// Directory holding the calibration JSON files (default: $LIMBSTAGE_CALIBRATION_DIR or `tuning`).
    #[arg(long, value_name = "DIR")]
    pub calibration_dir: Option<PathBuf>,

    /// Naming convention to read the nominal age from the file name.
    #[arg(long, value_enum)]
    pub parser: Option<NameParser>,

    /// Operator name written into output records (default: $LIMBSTAGE_OPERATOR or $USER).
    #[arg(long)]
    pub operator: Option<String>,

    #[command(flatten)]
    pub extractor: ExtractorArgs,

    /// Render the final radial profile as an ASCII plot.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write the companion record and a JSON result into this directory.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write a markdown dump of every refinement round into this directory.
    #[arg(long = "debug-bundle", value_name = "DIR")]
    pub debug_bundle: Option<PathBuf>,
}

/// Options for printing descriptors only.
#[derive(Debug, Args, Clone)]
pub struct DescriptorsArgs {
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,

    #[command(flatten)]
    pub extractor: ExtractorArgs,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Options for batch staging.
#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Directory with record files.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Naming convention of the record files.
    #[arg(long, value_enum, default_value_t = NameParser::Welsh)]
    pub parser: NameParser,

    #[arg(long, value_name = "DIR")]
    pub calibration_dir: Option<PathBuf>,

    #[command(flatten)]
    pub extractor: ExtractorArgs,

    /// Export per-specimen results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Options for writing a synthetic outline.
#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Output record path.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Number of digitized points.
    #[arg(short = 'n', long, default_value_t = 60)]
    pub points: usize,

    /// Mean radius.
    #[arg(long, default_value_t = 50.0)]
    pub radius: f64,

    /// Number of lobes (digit condensations).
    #[arg(long, default_value_t = 5)]
    pub lobes: usize,

    /// Relative lobe amplitude.
    #[arg(long, default_value_t = 0.15)]
    pub amplitude: f64,

    /// Gaussian jitter relative to the radius (0 disables it).
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed for the jitter.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long)]
    pub operator: Option<String>,
}

/// Options for writing the calibration table.
#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    /// Output directory (default: $LIMBSTAGE_CALIBRATION_DIR or `tuning`).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Number of rows in the densified table.
    #[arg(long, default_value_t = TABLE_RESOLUTION)]
    pub rows: usize,
}
