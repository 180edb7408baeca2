//! CLI command implementations.

pub mod closure;
pub mod cycles;
pub mod dependents;
pub mod edges;
pub mod stats;

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use colored::Colorize;
use deptrace::{Analysis, Config, Diagnostic, loader};

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored when attached to a terminal
    Text,
    /// One JSON document
    Json,
    /// JSON Lines, one record per line
    Jsonl,
}

/// Load configuration and inputs, then build the analysis.
///
/// Diagnostics are printed to stderr as warnings.
pub fn analyze(
    inputs: &[PathBuf],
    config_path: Option<&Path>,
) -> Result<Analysis, deptrace::Error> {
    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => match Config::search_dir(inputs) {
            Some(dir) => Config::discover(&dir)?,
            None => Config::default(),
        },
    };

    let loaded = loader::load_inputs(inputs)?;
    let analysis = Analysis::build(&loaded.sources, &config);

    print_diagnostics(loaded.diagnostics.iter().chain(&analysis.diagnostics));
    Ok(analysis)
}

fn print_diagnostics<'d>(diagnostics: impl Iterator<Item = &'d Diagnostic>) {
    for diag in diagnostics {
        eprintln!("{}: {diag}", "warning".yellow().bold());
    }
}

/// Write any serializable value as pretty JSON to stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), deptrace::Error> {
    let text = serde_json::to_string_pretty(value).map_err(|e| deptrace::Error::Io(e.into()))?;
    println!("{text}");
    Ok(())
}

/// Write any serializable value as one compact JSON line to stdout.
pub fn print_json_line<T: serde::Serialize>(value: &T) -> Result<(), deptrace::Error> {
    let text = serde_json::to_string(value).map_err(|e| deptrace::Error::Io(e.into()))?;
    println!("{text}");
    Ok(())
}
