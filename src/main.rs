//! Jobinfo Studio CLI
//!
//! A memory and timing profiling tool for batch data-processing jobs.
//! Turns raw job logs into CSV metric tables and compressed model archives.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use jobinfo_studio::commands::{execute_report, validate_args, ReportArgs};
use jobinfo_studio::output::archive;
use jobinfo_studio::utils::config::ARCHIVE_VERSION;

/// Jobinfo Studio - per-module memory and timing profiling for batch jobs
#[derive(Parser, Debug)]
#[command(name = "jobinfo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse job logs and write CSV metric tables
    Report {
        /// Input job log files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory to write output files into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Also save each parsed model as a compressed archive
        #[arg(short, long)]
        archive: bool,

        /// Also write per-module-type rollup tables
        #[arg(long)]
        by_type: bool,

        /// Print a ranked summary to stdout
        #[arg(long)]
        summary: bool,

        /// Number of modules in the ranked summary
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Validate a saved model archive
    Validate {
        /// Path to an archive file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Report {
            inputs,
            output_dir,
            archive,
            by_type,
            summary,
            top,
        } => {
            let args = ReportArgs {
                inputs,
                output_dir,
                write_archive: archive,
                by_type,
                print_summary: summary,
                top_modules: top,
            };

            // Validate args first
            validate_args(&args)?;

            // Execute report
            execute_report(args)?;
        }

        Commands::Validate { file } => {
            validate_archive_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Validate a saved model archive
///
/// **Private** - internal command implementation
fn validate_archive_file(file_path: PathBuf) -> Result<()> {
    println!("Validating archive: {}", file_path.display());

    let loaded = archive::load(&file_path)?;

    println!("✓ Valid model archive");
    println!("  Version:     {}", loaded.version);
    println!("  Written:     {}", loaded.generated_at);
    println!("  Steps:       {}", loaded.model.step_order().len());
    println!("  Modules:     {}", loaded.model.modules().len());
    println!("  RSS samples: {}", loaded.model.rss_samples().len());
    println!("  Has memory:  {}", loaded.model.contains_memory());
    println!("  Has timing:  {}", loaded.model.contains_timing());

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Jobinfo Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Archive Format: v{}", ARCHIVE_VERSION);
    println!();
    println!("A memory and timing profiling tool for batch data-processing jobs.");
}
