//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs the logger
//! - resolves environment defaults (`.env` supported)
//! - loads the calibration and runs the staging pipeline
//! - prints reports/plots and writes optional exports

use std::path::{Path, PathBuf};

use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{BatchArgs, Command, DescriptorsArgs, StageArgs, SynthArgs, TableArgs};
use crate::data::{SyntheticOutline, jittered_outline};
use crate::descriptors::extract;
use crate::domain::{BatchConfig, SpecimenResult, StageConfig};
use crate::error::AppError;
use crate::io::{
    SpecimenRecord, TABLE_FILE_NAME, load_calibration, write_calibration_table, write_measured_record,
};
use crate::staging::{WELSH_TABLE_ANCHORS, table_from_anchors};

pub mod batch;
pub mod pipeline;

/// Environment variable naming the calibration directory.
pub const CALIBRATION_DIR_ENV: &str = "LIMBSTAGE_CALIBRATION_DIR";
/// Environment variable naming the operator written into output records.
pub const OPERATOR_ENV: &str = "LIMBSTAGE_OPERATOR";
const DEFAULT_CALIBRATION_DIR: &str = "tuning";

/// Entry point for the `limbstage` binary.
pub fn run() -> Result<(), AppError> {
    // `limbstage rec.txt` behaves like `limbstage stage rec.txt`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);
    dotenvy::dotenv().ok();

    match cli.command {
        Command::Stage(args) => handle_stage(&stage_config_from_args(&args)),
        Command::Descriptors(args) => handle_descriptors(&args),
        Command::Batch(args) => handle_batch(&batch_config_from_args(&args)),
        Command::Synth(args) => handle_synth(&args),
        Command::Table(args) => handle_table(&args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG still wins when set.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn handle_stage(config: &StageConfig) -> Result<(), AppError> {
    let record = SpecimenRecord::load(&config.record, config.parser)?;
    let calibration = load_calibration(&config.calibration_dir)?;
    let run = pipeline::stage_outline(&record.points, &calibration, &config.extractor)?;

    println!(
        "{}",
        crate::report::format_stage_summary(
            &record.name,
            &run.extraction.descriptors,
            &run.prediction,
            record.nominal_age.as_ref(),
        )
    );

    if config.plot {
        let plot = crate::plot::render_profile_plot(
            run.extraction.final_round(),
            Some(&run.extraction.parabola),
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(dir) = &config.debug_dir {
        let path =
            crate::debug::write_debug_bundle(dir, &record.name, &run.extraction, Some(&run.prediction))?;
        info!("debug bundle written to {}", path.display());
    }

    if let Some(dir) = &config.output_dir {
        let result = SpecimenResult {
            name: record.name.clone(),
            side: record.side,
            nominal_age: record.nominal_age.clone(),
            descriptors: run.extraction.descriptors,
            prediction: Some(run.prediction),
            failure: None,
        };
        write_stage_outputs(dir, &record, &result, &config.operator)?;
        println!("Output record and JSON result saved to {}", dir.display());
    }

    Ok(())
}

/// Companion record of the digitized points plus the JSON result.
///
/// The record echoes the points as read, so reloading it mirrors left limbs
/// exactly once.
fn write_stage_outputs(
    dir: &Path,
    record: &SpecimenRecord,
    result: &SpecimenResult,
    operator: &str,
) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create output dir '{}': {e}", dir.display())))?;
    let stem = record.name.strip_suffix(".txt").unwrap_or(&record.name);
    write_measured_record(&dir.join(format!("{stem}.txt")), operator, stem, &record.body.measured)?;
    crate::io::write_result_json(&dir.join(format!("{stem}.json")), result, operator)
}

fn handle_descriptors(args: &DescriptorsArgs) -> Result<(), AppError> {
    let record = SpecimenRecord::load(&args.record, None)?;
    let extraction = extract(&record.points, &args.extractor.to_params())?;
    if args.json {
        let json = serde_json::to_string_pretty(&extraction.descriptors)
            .map_err(|e| AppError::new(4, format!("Failed to serialize descriptors: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_descriptors(&extraction.descriptors));
    }
    Ok(())
}

fn handle_batch(config: &BatchConfig) -> Result<(), AppError> {
    let calibration = load_calibration(&config.calibration_dir)?;
    let results = batch::run_batch(config, &calibration)?;
    let summary = crate::report::summarize_batch(&results);
    println!("{}", crate::report::format_batch_report(&results, &summary));

    if let Some(path) = &config.export_csv {
        crate::io::write_batch_csv(path, &results)?;
        info!("batch results exported to {}", path.display());
    }
    Ok(())
}

fn handle_synth(args: &SynthArgs) -> Result<(), AppError> {
    let shape = SyntheticOutline {
        points: args.points,
        radius: args.radius,
        lobes: args.lobes,
        amplitude: args.amplitude,
        noise: args.noise,
        seed: args.seed,
        ..SyntheticOutline::default()
    };
    let points = jittered_outline(&shape)?;
    let name = args
        .output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "synthetic".to_string());
    let operator = resolve_operator(args.operator.as_deref());
    write_measured_record(&args.output, &operator, &name, &points)?;
    println!("Wrote {} points to {}", points.len(), args.output.display());
    Ok(())
}

fn handle_table(args: &TableArgs) -> Result<(), AppError> {
    let dir = resolve_calibration_dir(args.out.as_deref());
    let path = write_welsh_table(&dir, args.rows)?;
    println!("Wrote {} table rows to {}", args.rows, path.display());
    Ok(())
}

/// Densify the Welsh anchors to `rows` rows and write `calibration_table.json` into `dir`.
fn write_welsh_table(dir: &Path, rows: usize) -> Result<PathBuf, AppError> {
    if rows < 2 {
        return Err(AppError::new(2, format!("A calibration table needs at least 2 rows, got {rows}.")));
    }
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", dir.display())))?;
    let path = dir.join(TABLE_FILE_NAME);
    write_calibration_table(&path, &table_from_anchors(&WELSH_TABLE_ANCHORS, rows))?;
    Ok(path)
}

pub fn stage_config_from_args(args: &StageArgs) -> StageConfig {
    StageConfig {
        record: args.record.clone(),
        calibration_dir: resolve_calibration_dir(args.calibration_dir.as_deref()),
        operator: resolve_operator(args.operator.as_deref()),
        parser: args.parser,
        extractor: args.extractor.to_params(),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        output_dir: args.output_dir.clone(),
        debug_dir: args.debug_bundle.clone(),
    }
}

pub fn batch_config_from_args(args: &BatchArgs) -> BatchConfig {
    BatchConfig {
        source_dir: args.dir.clone(),
        calibration_dir: resolve_calibration_dir(args.calibration_dir.as_deref()),
        parser: args.parser,
        extractor: args.extractor.to_params(),
        export_csv: args.export.clone(),
    }
}

/// Flag, then `$LIMBSTAGE_CALIBRATION_DIR`, then `tuning`.
fn resolve_calibration_dir(flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CALIBRATION_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CALIBRATION_DIR))
}

/// Flag, then `$LIMBSTAGE_OPERATOR`, then `$USER`, then `unknown`.
fn resolve_operator(flag: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| std::env::var(OPERATOR_ENV).ok())
        .or_else(|| std::env::var("USER").ok())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rewrite argv so a bare record path stages it.
///
/// Rules:
/// - `limbstage rec.txt ...`           -> `limbstage stage rec.txt ...`
/// - `limbstage <subcommand> ...`      -> unchanged
/// - `limbstage`, flags, help/version  -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_subcommand = matches!(
        arg1.as_str(),
        "stage" | "descriptors" | "batch" | "synth" | "table" | "help"
    );
    if is_subcommand || arg1.starts_with('-') {
        return argv;
    }

    argv.insert(1, "stage".to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_record_path_means_stage() {
        assert_eq!(
            rewrite_args(args(&["limbstage", "E14;06_L1_E3.txt", "--plot"])),
            args(&["limbstage", "stage", "E14;06_L1_E3.txt", "--plot"])
        );
    }

    #[test]
    fn subcommands_and_flags_are_untouched() {
        for argv in [
            args(&["limbstage"]),
            args(&["limbstage", "--help"]),
            args(&["limbstage", "-v", "batch", "dir"]),
            args(&["limbstage", "synth", "-o", "x.txt"]),
        ] {
            assert_eq!(rewrite_args(argv.clone()), argv);
        }
    }

    #[test]
    fn explicit_flags_win_over_environment() {
        assert_eq!(resolve_calibration_dir(Some(Path::new("cal"))), PathBuf::from("cal"));
        assert_eq!(resolve_operator(Some("ana")), "ana");
    }

    #[test]
    fn stage_config_carries_cli_choices() {
        let cli = crate::cli::Cli::parse_from([
            "limbstage",
            "stage",
            "rec.txt",
            "--calibration-dir",
            "cal",
            "--operator",
            "ana",
            "--plot",
            "--debug-bundle",
            "dbg",
        ]);
        let Command::Stage(stage) = cli.command else {
            panic!("expected stage");
        };
        let config = stage_config_from_args(&stage);
        assert_eq!(config.record, PathBuf::from("rec.txt"));
        assert_eq!(config.calibration_dir, PathBuf::from("cal"));
        assert_eq!(config.operator, "ana");
        assert!(config.plot);
        assert_eq!(config.debug_dir, Some(PathBuf::from("dbg")));
        assert_eq!(config.output_dir, None);
    }

    #[test]
    fn companion_record_echoes_digitized_points() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("E13.5_L2_LHL.txt");
        std::fs::write(&input, "ana E13.5_L2_LHL\nMEASURED 3 4\nMEASURED 5 6\n").unwrap();
        let record = SpecimenRecord::load(&input, None).unwrap();
        assert_eq!(record.points[0].x, -3.0);

        let result = SpecimenResult {
            name: record.name.clone(),
            side: record.side,
            nominal_age: None,
            descriptors: crate::domain::DescriptorVector::ZERO,
            prediction: None,
            failure: None,
        };
        let out = dir.path().join("out");
        write_stage_outputs(&out, &record, &result, "ana").unwrap();

        let echoed = out.join("E13.5_L2_LHL.txt");
        assert_eq!(crate::io::read_measured_points(&echoed).unwrap(), record.body.measured);
        // Reloading mirrors once, exactly like the original record.
        assert_eq!(SpecimenRecord::load(&echoed, None).unwrap().points, record.points);
    }

    #[test]
    fn welsh_table_is_written_into_the_calibration_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_welsh_table(&dir.path().join("tuning"), 40).unwrap();
        assert_eq!(path.file_name().unwrap(), TABLE_FILE_NAME);

        let table = crate::io::read_calibration_table(&path).unwrap();
        assert_eq!(table.rows.len(), 40);
        assert!((table.rows[0].1 - 318.0).abs() < 1e-9);
        assert!((table.rows[39].0 - 99.0).abs() < 1e-9);
    }

    #[test]
    fn welsh_table_needs_two_rows() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(write_welsh_table(dir.path(), 1).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn table_is_a_subcommand() {
        let argv = args(&["limbstage", "table", "--out", "cal"]);
        assert_eq!(rewrite_args(argv.clone()), argv);
    }
}
