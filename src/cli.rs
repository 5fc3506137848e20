//! Command-line surface
//!
//! The mode is chosen by how many positional arguments are given: a
//! directory alone writes the payload, a directory plus any second value
//! runs the read benchmark.

use crate::bench::{BenchmarkRunner, PayloadGenerator};
use crate::config::BenchmarkConfig;
use crate::io::disk::UncachedIo;
use crate::models::{ReadReport, WriteReport};
use crate::{BenchError, Result, APP_NAME, USAGE_EXIT_CODE};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Parser)]
#[command(name = "rawbench")]
#[command(author, version, about = "Raw storage I/O benchmark with the page cache bypassed")]
pub struct Cli {
    /// Directory on the device under test
    pub directory: Option<PathBuf>,

    /// Any further values run the read benchmark against a previously
    /// written data file; they are never interpreted
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub run_marker: Vec<String>,

    /// Only log results, warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the phase report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// What a single invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// No directory given
    Usage,
    /// Write the random payload into the directory
    Generate(PathBuf),
    /// Benchmark reads against the payload in the directory
    Benchmark(PathBuf),
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match &self.directory {
            None => Mode::Usage,
            Some(dir) if self.run_marker.is_empty() => Mode::Generate(dir.clone()),
            Some(dir) => Mode::Benchmark(dir.clone()),
        }
    }
}

/// Report of whichever phase ran
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Written(WriteReport),
    Measured(ReadReport),
}

/// Run one phase without any top-level error policy applied
pub fn run_mode<D: UncachedIo>(
    mode: &Mode,
    config: &BenchmarkConfig,
    disk_io: D,
) -> Result<Option<Outcome>> {
    match mode {
        Mode::Usage => Ok(None),
        Mode::Generate(dir) => {
            let generator = PayloadGenerator::with_disk_io(config.clone(), disk_io)?;
            generator.run(dir).map(|r| Some(Outcome::Written(r)))
        }
        Mode::Benchmark(dir) => {
            let runner = BenchmarkRunner::with_disk_io(config.clone(), disk_io)?;
            let report = runner.run(dir)?;
            debug!("{}", report.summary());
            Ok(Some(Outcome::Measured(report)))
        }
    }
}

/// Execute the invocation described by `cli` and return the process exit
/// status. Failures are logged, the target file is removed if one was
/// left behind, and no partial results are printed.
pub fn execute<D: UncachedIo>(cli: &Cli, config: &BenchmarkConfig, disk_io: D) -> u8 {
    let mode = cli.mode();
    let dir = match &mode {
        Mode::Usage => {
            warn!("usage: {} /path/on/device [run]", APP_NAME);
            return USAGE_EXIT_CODE;
        }
        Mode::Generate(dir) | Mode::Benchmark(dir) => dir.clone(),
    };
    debug!("temporary file: {}", config.target_path(&dir).display());

    match run_mode(&mode, config, disk_io) {
        Ok(outcome) => {
            if cli.json {
                if let Some(outcome) = outcome {
                    print_json(&outcome);
                }
            }
            0
        }
        Err(err) => {
            handle_failure(&err, &config.target_path(&dir));
            err.exit_code()
        }
    }
}

/// Log `err` and best-effort delete the target. A precondition failure
/// never touched the filesystem, so any file present belongs to an
/// earlier run and is kept.
pub fn handle_failure(err: &BenchError, target: &Path) {
    warn!("caught exception: {}", err);
    warn!("cleaning up, and exiting");
    if err.is_precondition() || !target.exists() {
        return;
    }
    match std::fs::remove_file(target) {
        Ok(()) => warn!("removing temporary files"),
        Err(remove_err) => warn!(error = %remove_err, "could not remove temporary files"),
    }
}

fn print_json(outcome: &Outcome) {
    match serde_json::to_string_pretty(outcome) {
        Ok(json) => println!("{}", json),
        Err(err) => warn!(error = %err, "could not serialize report"),
    }
    info!("report written to stdout");
}
