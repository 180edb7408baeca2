//! Edge-list output.
//!
//! Edges are flattened into [`EdgeRecord`]s ordered lexically by dependent
//! name, then by insertion order, and written as a JSON array or JSON Lines.
//! The same ordering feeds the graph fingerprint.

use std::io::Write;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::symbols::SymbolTable;
use crate::types::{DependencyKind, Site, Target};

/// One edge with both endpoints rendered as names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Dependent: `Name` or `Name::member`
    pub from: String,
    /// Dependency: `Name`, `Name::member`, or the unresolved name
    pub to: String,
    /// How the dependency is used
    pub kind: DependencyKind,
    /// Declaration-level or body-level reference
    pub site: Site,
    /// The dependency matched no declaration
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unresolved: bool,
    /// The dependency is a builtin stub
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

/// Flatten the graph into ordered records.
#[must_use]
pub fn edge_records(table: &SymbolTable, graph: &DependencyGraph) -> Vec<EdgeRecord> {
    let mut records: Vec<EdgeRecord> = graph
        .edges()
        .iter()
        .map(|edge| {
            let (to, unresolved, external) = match &edge.to {
                Target::Resolved(node) => (
                    table.node_name(*node),
                    false,
                    table.get(node.symbol).is_builtin,
                ),
                Target::Unresolved(name) => (name.clone(), true, false),
            };
            EdgeRecord {
                from: table.node_name(edge.from),
                to,
                kind: edge.kind,
                site: edge.site,
                unresolved,
                external,
            }
        })
        .collect();
    // Stable: insertion order survives within one dependent
    records.sort_by(|a, b| a.from.cmp(&b.from));
    records
}

/// Write records as one pretty-printed JSON array.
///
/// # Errors
///
/// Returns `Error::Io` if writing fails.
pub fn write_json<W: Write>(records: &[EdgeRecord], mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, records).map_err(|e| Error::Io(e.into()))?;
    writeln!(out)?;
    Ok(())
}

/// Write records as JSON Lines, one edge per line.
///
/// # Errors
///
/// Returns `Error::Io` if writing fails.
pub fn write_jsonl<W: Write>(records: &[EdgeRecord], mut out: W) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut out, record).map_err(|e| Error::Io(e.into()))?;
        writeln!(out)?;
    }
    Ok(())
}

/// Render one record as a plain text line.
#[must_use]
pub fn text_line(record: &EdgeRecord) -> String {
    let mut line = format!(
        "{} -> {} [{}, {}]",
        record.from,
        record.to,
        record.kind,
        record.site.as_str()
    );
    if record.unresolved {
        line.push_str(" (unresolved)");
    }
    if record.external {
        line.push_str(" (external)");
    }
    line
}

/// `xxh3` hash of the ordered record list.
///
/// Equal for equal graphs regardless of how they were built.
#[must_use]
pub fn fingerprint(records: &[EdgeRecord]) -> u64 {
    let mut hasher = Xxh3::new();
    for record in records {
        for field in [
            record.from.as_str(),
            record.to.as_str(),
            record.kind.as_str(),
            record.site.as_str(),
        ] {
            hasher.update(field.as_bytes());
            hasher.update(&[0]);
        }
        hasher.update(&[u8::from(record.unresolved), u8::from(record.external), b'\n']);
    }
    hasher.digest()
}
