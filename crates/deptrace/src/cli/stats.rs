//! `deptrace stats` command implementation.

use std::path::{Path, PathBuf};

use colored::Colorize;
use deptrace::Error;

use super::OutputFormat;

/// Run the stats command.
pub fn run(inputs: &[PathBuf], config: Option<&Path>, format: OutputFormat) -> Result<(), Error> {
    let analysis = super::analyze(inputs, config)?;
    let stats = analysis.stats();
    let fingerprint = analysis.fingerprint();

    if format != OutputFormat::Text {
        let mut value = serde_json::to_value(&stats).map_err(|e| Error::Io(e.into()))?;
        value["fingerprint"] = serde_json::Value::String(format!("{fingerprint:016x}"));
        return match format {
            OutputFormat::Jsonl => super::print_json_line(&value),
            _ => super::print_json(&value),
        };
    }

    println!("{}", "Deptrace Statistics".cyan().bold());
    println!();

    println!(
        "  {}: {} total",
        "Symbols".white().bold(),
        stats.symbols.to_string().green()
    );
    // Sort by count descending, then by kind for deterministic output
    let mut kind_counts: Vec<_> = stats.symbols_by_kind.iter().collect();
    kind_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (kind, count) in kind_counts {
        println!("    {}: {}", kind.as_str().dimmed(), count);
    }
    println!();

    println!(
        "  {}: {} total",
        "Edges".white().bold(),
        stats.edges.to_string().green()
    );
    let mut edge_counts: Vec<_> = stats.edges_by_kind.iter().collect();
    edge_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (kind, count) in edge_counts {
        println!("    {}: {}", kind.as_str().dimmed(), count);
    }
    println!();

    let unresolved = if stats.unresolved_edges == 0 {
        "0".green()
    } else {
        stats.unresolved_edges.to_string().red()
    };
    println!("  {}: {}", "Unresolved".white().bold(), unresolved);
    println!("  {}: {}", "External".white().bold(), stats.external_edges);
    println!(
        "  {}: {}",
        "Fingerprint".white().bold(),
        format!("{fingerprint:016x}").dimmed()
    );

    Ok(())
}
