//! `deptrace dependents` command implementation.

use std::path::{Path, PathBuf};

use colored::Colorize;
use deptrace::Error;

use super::OutputFormat;

/// Run the dependents command.
pub fn run(
    inputs: &[PathBuf],
    config: Option<&Path>,
    symbol: &str,
    format: OutputFormat,
) -> Result<(), Error> {
    let analysis = super::analyze(inputs, config)?;
    let dependents = analysis.dependents(symbol)?;

    match format {
        OutputFormat::Json => super::print_json(&dependents)?,
        OutputFormat::Jsonl => {
            for dependent in &dependents {
                super::print_json_line(dependent)?;
            }
        }
        OutputFormat::Text => {
            if dependents.is_empty() {
                println!("No symbols depend on \"{}\"", symbol.cyan());
                return Ok(());
            }

            println!(
                "{} of \"{}\":",
                "Dependents".white().bold(),
                symbol.cyan().bold()
            );
            for dependent in &dependents {
                let kinds = dependent
                    .kinds
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!(
                    "  {} {} {}",
                    "•".dimmed(),
                    dependent.symbol,
                    format!("({kinds})").dimmed()
                );
            }
        }
    }
    Ok(())
}
