//! Report command implementation.
//!
//! The report command:
//! 1. Parses each input log into its own model
//! 2. Writes one CSV table per metric present in the data
//! 3. Optionally writes per-type rollup tables
//! 4. Optionally archives the model
//! 5. Optionally prints a ranked summary

use crate::aggregator::metrics::top_modules_by;
use crate::aggregator::{RunModel, TypeRollup};
use crate::output::{archive, csv};
use crate::utils::config::ARCHIVE_EXTENSION;
use anyhow::{bail, Context, Result};
use log::{error, info};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Arguments for the report command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReportArgs {
    /// Input job log files, processed independently
    pub inputs: Vec<PathBuf>,

    /// Directory the CSV tables (and archives) are written into
    pub output_dir: PathBuf,

    /// Also save each parsed model as a compressed archive
    pub write_archive: bool,

    /// Also write per-module-type rollup tables
    pub by_type: bool,

    /// Print a ranked summary to stdout
    pub print_summary: bool,

    /// Number of modules in the ranked summary
    pub top_modules: usize,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output_dir: PathBuf::from("."),
            write_archive: false,
            by_type: false,
            print_summary: false,
            top_modules: 10,
        }
    }
}

/// Validate report arguments
///
/// **Public** - can be called before execute_report for early validation
pub fn validate_args(args: &ReportArgs) -> Result<()> {
    if args.inputs.is_empty() {
        bail!("at least one input log file is required");
    }

    if args.top_modules == 0 {
        bail!("top must be greater than 0");
    }

    if args.top_modules > 1000 {
        bail!("top is too large (max 1000)");
    }

    Ok(())
}

/// Execute the report command
///
/// **Public** - main entry point called from main.rs
///
/// Each input file is parsed into its own model and exported on its own. A
/// file that fails to parse is reported by name and its model discarded
/// entirely; remaining inputs still run. The command as a whole fails only
/// when every input failed.
pub fn execute_report(args: ReportArgs) -> Result<()> {
    let mut failed: Vec<PathBuf> = Vec::new();

    for input in &args.inputs {
        if let Err(e) = process_file(input, &args) {
            error!("Failed to process {}: {:#}", input.display(), e);
            failed.push(input.clone());
        }
    }

    if !failed.is_empty() {
        if failed.len() == args.inputs.len() {
            bail!("all {} input file(s) failed to parse", failed.len());
        }
        info!(
            "Processed {} of {} input file(s)",
            args.inputs.len() - failed.len(),
            args.inputs.len()
        );
    }

    Ok(())
}

/// Parse one log file and write its outputs
///
/// **Private** - internal helper for execute_report
fn process_file(input: &Path, args: &ReportArgs) -> Result<()> {
    info!("Parsing log file: {}", input.display());

    let file =
        File::open(input).with_context(|| format!("failed to open {}", input.display()))?;

    let mut model = RunModel::new();
    model
        .parse_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", input.display()))?;

    if model.is_empty() {
        info!("No diagnostic records found in {}", input.display());
    }

    let stem = file_stem(input);
    let metrics = csv::metrics_for(&model);

    for metric in &metrics {
        let path = args
            .output_dir
            .join(format!("{}_{}.csv", stem, metric.label()));
        csv::write_metric_file(&path, &model, *metric)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if args.by_type {
        let rollup = TypeRollup::from_view(&model);
        for metric in &metrics {
            let path = args
                .output_dir
                .join(format!("{}_by_type_{}.csv", stem, metric.label()));
            csv::write_metric_file(&path, &rollup, *metric)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
    }

    if args.write_archive {
        let path = args
            .output_dir
            .join(format!("{}.{}", stem, ARCHIVE_EXTENSION));
        archive::save(&model, &path)
            .with_context(|| format!("failed to write archive {}", path.display()))?;
        info!("✓ Archive written to: {}", path.display());
    }

    if args.print_summary {
        print_summary(input, &model, args.top_modules);
    }

    Ok(())
}

/// Output file stem for one input path
///
/// **Private** - internal utility
fn file_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string())
}

/// Print the ranked text summary for one parsed model
///
/// **Private** - internal helper for process_file
fn print_summary(input: &Path, model: &RunModel, top_modules: usize) {
    println!("\n{}", "=".repeat(80));
    println!("RUN SUMMARY: {}", input.display());
    println!("{}", "=".repeat(80));
    println!("Steps:       {}", model.step_order().len());
    println!("Modules:     {}", model.modules().len());
    println!("RSS samples: {}", model.rss_samples().len());
    println!("Has memory:  {}", model.contains_memory());
    println!("Has timing:  {}", model.contains_timing());

    if model.contains_memory() {
        println!("\nTop {} modules by peak memory:", top_modules);
        for name in top_modules_by(model, |sample| sample.peak_mib, top_modules) {
            let peak = model
                .module(&name)
                .map(|record| {
                    record
                        .memory_by_step()
                        .values()
                        .map(|sample| sample.peak_mib)
                        .fold(0.0_f64, f64::max)
                })
                .unwrap_or(0.0);
            println!("  {:<40} {:>12.3} MiB", name, peak);
        }
    }

    println!("{}", "=".repeat(80));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_valid() {
        let args = ReportArgs {
            inputs: vec![PathBuf::from("job.log")],
            ..Default::default()
        };

        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_no_inputs() {
        let args = ReportArgs::default();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_top_zero() {
        let args = ReportArgs {
            inputs: vec![PathBuf::from("job.log")],
            top_modules: 0,
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_top_too_large() {
        let args = ReportArgs {
            inputs: vec![PathBuf::from("job.log")],
            top_modules: 2000,
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_file_stem_fallback() {
        assert_eq!(file_stem(Path::new("logs/job1.log")), "job1");
        assert_eq!(file_stem(Path::new("..")), "report");
    }
}
