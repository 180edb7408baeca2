//! `deptrace cycles` command implementation.

use std::path::{Path, PathBuf};

use colored::Colorize;
use deptrace::Error;

use super::OutputFormat;

/// Run the cycles command.
pub fn run(
    inputs: &[PathBuf],
    config: Option<&Path>,
    self_loops: bool,
    format: OutputFormat,
) -> Result<(), Error> {
    let analysis = super::analyze(inputs, config)?;

    let cycles = analysis.cycles(self_loops);

    match format {
        OutputFormat::Json => return super::print_json(&cycles),
        OutputFormat::Jsonl => {
            for cycle in &cycles {
                super::print_json_line(cycle)?;
            }
            return Ok(());
        }
        OutputFormat::Text => {}
    }

    if cycles.is_empty() {
        println!("{}", "No dependency cycles detected.".green());
        return Ok(());
    }

    println!(
        "Found {} dependency cycles:",
        cycles.len().to_string().red().bold()
    );
    println!();

    // Members are sorted, not in traversal order
    for (i, cycle) in cycles.iter().enumerate() {
        println!("  {} {}:", "Cycle".yellow().bold(), i + 1);
        println!("    {}", cycle.to_string().dimmed());
    }

    Ok(())
}
