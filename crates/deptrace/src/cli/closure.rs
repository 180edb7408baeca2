//! `deptrace closure` command implementation.

use std::path::{Path, PathBuf};

use colored::Colorize;
use deptrace::{Closure, Error};

use super::OutputFormat;

/// Run the closure command.
pub fn run(
    inputs: &[PathBuf],
    config: Option<&Path>,
    symbol: &str,
    fine: bool,
    format: OutputFormat,
) -> Result<(), Error> {
    let analysis = super::analyze(inputs, config)?;
    let closure = if fine {
        analysis.fine_closure(symbol)?
    } else {
        analysis.coarse_closure(symbol)?
    };

    match format {
        OutputFormat::Json => super::print_json(&closure)?,
        OutputFormat::Jsonl => {
            for name in &closure.symbols {
                super::print_json_line(&serde_json::json!({ "symbol": name }))?;
            }
            for name in &closure.unresolved {
                super::print_json_line(&serde_json::json!({ "symbol": name, "unresolved": true }))?;
            }
        }
        OutputFormat::Text => print_text(&closure, fine),
    }
    Ok(())
}

fn print_text(closure: &Closure, fine: bool) {
    let title = if fine {
        "Fine closure"
    } else {
        "Coarse closure"
    };

    if closure.symbols.is_empty() && closure.unresolved.is_empty() {
        println!("\"{}\" has no dependencies", closure.seed.cyan());
        return;
    }

    println!(
        "{} of \"{}\":",
        title.white().bold(),
        closure.seed.cyan().bold()
    );
    for name in &closure.symbols {
        println!("  {} {name}", "•".dimmed());
    }
    for name in &closure.unresolved {
        println!("  {} {} {}", "•".dimmed(), name.red(), "(unresolved)".dimmed());
    }

    println!();
    println!(
        "{}: {} symbols, {} unresolved",
        "Summary".dimmed(),
        closure.symbols.len().to_string().green(),
        closure.unresolved.len()
    );
}
