//! # Deptrace: Static Dependency Extraction for Hack Declarations
//!
//! Deptrace computes, for every declared class, function, constant, type
//! alias and enum, the set of other symbols it depends on. It works on
//! already-parsed declaration records and distinguishes *fine-grained*
//! member-level dependencies from *coarse-grained* whole-symbol ones.
//!
//! ## Design Philosophy
//!
//! - **Static only** - Dependencies come from what is written; nothing is inferred or run
//! - **Best effort** - Unresolved names become flagged edges, never failures
//! - **Deterministic** - The same input always yields the same edges in the same order
//! - **Library first, CLI second**
//!
//! ## Quick Start
//!
//! ```no_run
//! use deptrace::{Analysis, Config, loader};
//! use std::path::PathBuf;
//!
//! let loaded = loader::load_inputs(&[PathBuf::from("decls/")])?;
//! let analysis = Analysis::build(&loaded.sources, &Config::default());
//!
//! let closure = analysis.coarse_closure("Derived")?;
//! println!("Derived depends on {:?}", closure.symbols);
//! # Ok::<(), deptrace::Error>(())
//! ```

pub mod ast;
pub mod collector;
pub mod config;
pub mod graph;
pub mod loader;
pub mod query;
pub mod report;
pub mod symbols;

mod error;
mod types;

pub use config::{Builtins, Config, ConstructionPolicy};
pub use error::{
    Diagnostic, DiagnosticKind, DuplicateSymbolError, Error, Result, UnknownSymbolError,
};
pub use graph::DependencyGraph;
pub use query::{Closure, Dependent, GraphStats, Seed};
pub use report::EdgeRecord;
pub use symbols::{Resolution, Scope, SymbolTable};
pub use types::{
    Cycle, DependencyKind, Edge, Location, Member, MemberId, MemberKind, Node, Site, Symbol,
    SymbolId, SymbolKind, SymbolSpace, Target, Visibility,
};

use ast::SourceFile;

/// A built symbol table and dependency graph.
///
/// `Analysis` is the entry point for queries. It is immutable once built;
/// any source change means building a new one.
#[derive(Debug)]
pub struct Analysis {
    /// Every declared symbol
    pub table: SymbolTable,
    /// Deduplicated dependency edges
    pub graph: DependencyGraph,
    /// Soft findings: duplicates and unresolved references
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    /// Analyze a set of source files.
    #[must_use]
    pub fn build(sources: &[SourceFile], config: &Config) -> Self {
        graph::build(sources, config)
    }

    /// Transitive dependencies of `seed` over all edges.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownSymbol` if `seed` names nothing.
    pub fn coarse_closure(&self, seed: &str) -> Result<Closure> {
        Ok(query::coarse_closure(&self.table, &self.graph, seed)?)
    }

    /// Dependencies needed to declare `seed`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownSymbol` if `seed` names nothing.
    pub fn fine_closure(&self, seed: &str) -> Result<Closure> {
        Ok(query::fine_closure(&self.table, &self.graph, seed)?)
    }

    /// Direct dependents of `seed`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownSymbol` if `seed` names nothing.
    pub fn dependents(&self, seed: &str) -> Result<Vec<Dependent>> {
        Ok(query::dependents(&self.table, &self.graph, seed)?)
    }

    /// Dependency cycles between symbols.
    #[must_use]
    pub fn cycles(&self, include_self_loops: bool) -> Vec<Cycle> {
        query::cycles(&self.table, &self.graph, include_self_loops)
    }

    /// Symbol and edge counts.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        query::stats(&self.table, &self.graph)
    }

    /// Ordered edge records for output.
    #[must_use]
    pub fn edge_records(&self) -> Vec<EdgeRecord> {
        report::edge_records(&self.table, &self.graph)
    }

    /// Reproducibility hash of the edge list.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        report::fingerprint(&self.edge_records())
    }
}
