//! Two-phase graph construction.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           build                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Phase 1 (Sequential): declare every symbol, then finalize   │
//! │  Phase 2 (Parallel):   rayon::par_iter() reference collection│
//! │  Phase 3 (Sequential): ordered edge insertion                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Workers only read the finalized symbol table and each returns its own edge
//! list. Lists are joined in declaration order, so the resulting graph does
//! not depend on scheduling.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::Analysis;
use crate::ast::{Declaration, SourceFile};
use crate::collector;
use crate::config::Config;
use crate::error::Diagnostic;
use crate::symbols::SymbolTable;
use crate::types::{Edge, SymbolId, Target};

use super::DependencyGraph;

/// Build the symbol table and dependency graph for a set of files.
///
/// Identical input produces identical edges in identical order.
#[must_use]
pub fn build(sources: &[SourceFile], config: &Config) -> Analysis {
    let mut diagnostics = Vec::new();

    // Phase 1: declare-all
    let mut table = SymbolTable::new();
    table.register_builtins(&config.builtins);

    let mut declared: Vec<(SymbolId, &Declaration)> = Vec::new();
    for file in sources {
        let (decls, duplicates) = table.declare_file(file);
        declared.extend(decls);
        diagnostics.extend(duplicates.iter().map(Diagnostic::duplicate_symbol));
    }
    table.finalize();
    declared.retain(|(id, _)| table.is_live(*id));

    debug!(
        files = sources.len(),
        symbols = table.len(),
        parallel = config.parallel,
        "Collecting references"
    );

    // Phase 2: resolve-all
    let policy = config.construction;
    let collected: Vec<Vec<Edge>> = if config.parallel {
        declared
            .par_iter()
            .map(|(id, decl)| collector::collect(&table, policy, *id, decl))
            .collect()
    } else {
        declared
            .iter()
            .map(|(id, decl)| collector::collect(&table, policy, *id, decl))
            .collect()
    };

    // Phase 3: ordered insertion
    let mut graph = DependencyGraph::new();
    for edge in collected.into_iter().flatten() {
        let unresolved = match &edge.to {
            Target::Unresolved(name) => Some(name.clone()),
            Target::Resolved(_) => None,
        };
        let from = edge.from;
        if graph.add_edge(edge)
            && let Some(name) = unresolved
        {
            let path = table.get(from.symbol).location.path.clone();
            diagnostics.push(Diagnostic::unresolved_reference(
                path,
                &table.node_name(from),
                &name,
            ));
        }
    }

    info!(
        symbols = table.len(),
        edges = graph.len(),
        unresolved = graph.unresolved_count(),
        diagnostics = diagnostics.len(),
        "Built dependency graph"
    );

    Analysis {
        table,
        graph,
        diagnostics,
    }
}
