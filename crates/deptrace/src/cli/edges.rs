//! `deptrace edges` command implementation.

use std::path::{Path, PathBuf};

use colored::Colorize;
use deptrace::report::{self, EdgeRecord};
use deptrace::{DependencyKind, Error};

use super::OutputFormat;

/// Run the edges command.
pub fn run(
    inputs: &[PathBuf],
    config: Option<&Path>,
    format: OutputFormat,
    kind: Option<&str>,
) -> Result<(), Error> {
    let kind = kind
        .map(|name| {
            DependencyKind::from_name(name)
                .ok_or_else(|| Error::Config(format!("unknown dependency kind '{name}'")))
        })
        .transpose()?;

    let analysis = super::analyze(inputs, config)?;
    let records: Vec<EdgeRecord> = analysis
        .edge_records()
        .into_iter()
        .filter(|r| kind.is_none_or(|k| r.kind == k))
        .collect();

    let stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Json => report::write_json(&records, stdout),
        OutputFormat::Jsonl => report::write_jsonl(&records, stdout),
        OutputFormat::Text => {
            print_text(&records);
            Ok(())
        }
    }
}

fn print_text(records: &[EdgeRecord]) {
    if records.is_empty() {
        println!("{}", "No dependency edges.".dimmed());
        return;
    }

    let mut current: Option<&str> = None;
    for record in records {
        if current != Some(record.from.as_str()) {
            if current.is_some() {
                println!();
            }
            println!("{}", record.from.white().bold());
            current = Some(&record.from);
        }

        let target = if record.unresolved {
            record.to.red().to_string()
        } else if record.external {
            record.to.dimmed().to_string()
        } else {
            record.to.cyan().to_string()
        };
        let mut line = format!(
            "  {} {target} {}",
            "→".dimmed(),
            format!("[{}, {}]", record.kind, record.site.as_str()).dimmed()
        );
        if record.unresolved {
            line.push_str(&format!(" {}", "unresolved".red()));
        }
        if record.external {
            line.push_str(&format!(" {}", "external".yellow()));
        }
        println!("{line}");
    }

    println!();
    println!(
        "{}: {} edges",
        "Summary".dimmed(),
        records.len().to_string().green()
    );
}
