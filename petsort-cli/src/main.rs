//! Command-line driver for coincidence sorting and output verification.
#![allow(clippy::uninlined_format_args, clippy::too_many_lines)]

use clap::{Parser, Subcommand};

use petsort_algorithms::{
    par_sort_coincidences, sort_coincidences_with_progress, SortConfig, DEFAULT_DELAY_OFFSET_NS,
    DEFAULT_TIME_WINDOW_NS,
};
use petsort_core::{CoincidenceBatch, SinglesBatch, VolumeTable};
use petsort_io::{
    read_singles_hdf5, write_coincidences_hdf5, CoincidenceFileWriter, TableWriteOptions,
    DEFAULT_COINCIDENCES_GROUP, DEFAULT_SINGLES_GROUP,
};
use petsort_verify::{compare_stats, read_stats_file};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    PetsortIo(#[from] petsort_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] petsort_core::Error),

    #[error("Verification error: {0}")]
    Verify(#[from] petsort_verify::Error),

    #[error("Summary error: {0}")]
    Summary(#[from] serde_json::Error),
}

/// Offline processing for simulated PET singles.
#[derive(Parser)]
#[command(name = "petsort")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort singles into prompt (and optionally delayed) coincidences
    Sort {
        /// Input HDF5 singles file
        input: PathBuf,

        /// Output file path (.csv for text, anything else for HDF5)
        #[arg(short, long)]
        output: PathBuf,

        /// Also run a delayed pass and write it to this path
        #[arg(long)]
        delayed_output: Option<PathBuf>,

        /// Coincidence time window (nanoseconds)
        #[arg(long, default_value_t = DEFAULT_TIME_WINDOW_NS)]
        time_window_ns: f64,

        /// Time shift applied during the delayed pass (nanoseconds)
        #[arg(long, default_value_t = DEFAULT_DELAY_OFFSET_NS)]
        delay_offset_ns: f64,

        /// HDF5 group holding the singles table
        #[arg(long, default_value = DEFAULT_SINGLES_GROUP)]
        singles_group: String,

        /// Sort spans of the time-ordered stream in parallel
        #[arg(long)]
        parallel: bool,

        /// Progress report interval in singles (0 disables)
        #[arg(long, default_value = "100000")]
        progress_every: usize,

        /// Write a JSON run summary to this path
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a singles file
    Info {
        /// Input HDF5 singles file
        input: PathBuf,

        /// HDF5 group holding the singles table
        #[arg(long, default_value = DEFAULT_SINGLES_GROUP)]
        singles_group: String,
    },

    /// Compare a run statistics file against a reference
    CompareStats {
        /// Statistics file from the run under test
        #[arg(short, long)]
        test: PathBuf,

        /// Reference statistics file
        #[arg(short, long)]
        reference: PathBuf,

        /// Relative tolerance as a fraction (0.1 = 10%)
        #[arg(long, default_value = "0.1")]
        tolerance: f64,
    },
}

/// Machine-readable summary of a sort run.
#[derive(Serialize)]
struct RunSummary {
    input: String,
    singles: usize,
    time_window_ns: f64,
    prompt_coincidences: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    delay_offset_ns: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delayed_coincidences: Option<usize>,
    elapsed_seconds: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sort {
            input,
            output,
            delayed_output,
            time_window_ns,
            delay_offset_ns,
            singles_group,
            parallel,
            progress_every,
            summary,
            verbose,
        } => {
            if verbose {
                eprintln!("Reading: {}", input.display());
                eprintln!("Time window: {} ns", time_window_ns);
                if delayed_output.is_some() {
                    eprintln!("Delay offset: {} ns", delay_offset_ns);
                }
            }

            let start = Instant::now();
            let table = read_singles_hdf5(&input, &singles_group)?;
            println!("Total singles: {}", table.singles.len());

            let prompt_config = SortConfig::default().with_time_window_ns(time_window_ns);
            let prompt = run_pass(
                &table.singles,
                &prompt_config,
                parallel,
                progress_every,
                "prompt",
            )?;
            println!("Prompt coincidences: {}", prompt.len());
            write_output(&output, &prompt, &table.volumes, verbose)?;

            let mut delayed_len = None;
            if let Some(path) = &delayed_output {
                let delayed_config = prompt_config.with_offset_ns(delay_offset_ns);
                let delayed = run_pass(
                    &table.singles,
                    &delayed_config,
                    parallel,
                    progress_every,
                    "delayed",
                )?;
                println!("Delayed coincidences: {}", delayed.len());
                write_output(path, &delayed, &table.volumes, verbose)?;
                delayed_len = Some(delayed.len());
            }

            let elapsed = start.elapsed();
            println!(
                "Sorted {} singles in {:.2}s",
                table.singles.len(),
                elapsed.as_secs_f64()
            );

            if let Some(path) = summary {
                let run = RunSummary {
                    input: input.display().to_string(),
                    singles: table.singles.len(),
                    time_window_ns,
                    prompt_coincidences: prompt.len(),
                    delay_offset_ns: delayed_output.as_ref().map(|_| delay_offset_ns),
                    delayed_coincidences: delayed_len,
                    elapsed_seconds: elapsed.as_secs_f64(),
                };
                std::fs::write(&path, serde_json::to_string_pretty(&run)?)?;
                if verbose {
                    eprintln!("Summary written to: {}", path.display());
                }
            }
        }

        Commands::Info {
            input,
            singles_group,
        } => {
            let table = read_singles_hdf5(&input, &singles_group)?;
            let singles = &table.singles;

            println!("File: {}", input.display());
            println!("Singles: {}", singles.len());
            println!("Volumes: {}", table.volumes.len());

            if !singles.is_empty() {
                let min_t = singles.time_ns.iter().copied().fold(f64::INFINITY, f64::min);
                let max_t = singles
                    .time_ns
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max);
                println!("Time range: {} - {} ns", min_t, max_t);

                let min_e = singles.energy.iter().copied().fold(f64::INFINITY, f64::min);
                let max_e = singles
                    .energy
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max);
                println!("Energy range: {} - {} MeV", min_e, max_e);

                let min_run = singles.run_id.iter().copied().min().unwrap();
                let max_run = singles.run_id.iter().copied().max().unwrap();
                println!("Run range: {} - {}", min_run, max_run);
            }
        }

        Commands::CompareStats {
            test,
            reference,
            tolerance,
        } => {
            let test_stats = read_stats_file(&test)?;
            let reference_stats = read_stats_file(&reference)?;

            let report = compare_stats(&test_stats, &reference_stats, tolerance);
            for check in &report.checks {
                let glyph = if check.passed { "✓" } else { "✗" };
                println!("{} {}: {}", glyph, check.label, check.detail);
            }

            if report.passed() {
                println!("PASSED");
            } else {
                println!(
                    "FAILED ({} of {} checks)",
                    report.failed_count(),
                    report.checks.len()
                );
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn run_pass(
    singles: &SinglesBatch,
    config: &SortConfig,
    parallel: bool,
    progress_every: usize,
    label: &str,
) -> Result<CoincidenceBatch> {
    let batch = if parallel {
        par_sort_coincidences(singles, config)?
    } else {
        sort_coincidences_with_progress(singles, config, progress_every, |progress| {
            eprintln!(
                "[{}] processed {}/{} singles, {} coincidences found",
                label, progress.processed, progress.total, progress.found
            );
        })?
    };
    Ok(batch)
}

fn write_output(
    path: &Path,
    batch: &CoincidenceBatch,
    volumes: &VolumeTable,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("Writing output to: {}", path.display());
    }
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or_else(String::new, str::to_lowercase);
    if format == "csv" {
        let mut writer = CoincidenceFileWriter::create(path)?;
        writer.write_csv(batch, volumes)?;
    } else {
        write_coincidences_hdf5(
            path,
            DEFAULT_COINCIDENCES_GROUP,
            batch,
            volumes,
            &TableWriteOptions::default(),
        )?;
    }
    Ok(())
}
