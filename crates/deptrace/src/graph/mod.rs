//! Dependency graph storage and construction.
//!
//! The graph is a directed multigraph over [`Node`]s: an edge is identified
//! by `(from, to, kind)`, so two nodes can be linked by several kinds but
//! never twice by the same kind.
//!
//! ## Design
//!
//! | Concern | Choice |
//! |---------|--------|
//! | Storage | Insertion-ordered `Vec<Edge>` plus a dedupe index |
//! | Traversal | Per-symbol adjacency lists (outgoing and incoming) |
//! | Duplicate edge seen from body and signature | Signature site wins |
//! | Algorithms (SCC) | `petgraph`, projected on demand in `query` |

mod builder;

pub use builder::build;

use std::collections::HashMap;

use crate::types::{DependencyKind, Edge, Node, Site, SymbolId, Target};

/// Deduplicated, insertion-ordered edge store.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    edges: Vec<Edge>,
    index: HashMap<(Node, Target, DependencyKind), usize>,
    /// Edges whose dependent belongs to the symbol
    outgoing: HashMap<SymbolId, Vec<usize>>,
    /// Edges whose dependency belongs to the symbol
    incoming: HashMap<SymbolId, Vec<usize>>,
}

impl DependencyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an edge. Returns `true` if it was not already present.
    ///
    /// Re-inserting a known edge from a signature site upgrades its site.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        let key = (edge.from, edge.to.clone(), edge.kind);
        if let Some(&idx) = self.index.get(&key) {
            if edge.site == Site::Signature {
                self.edges[idx].site = Site::Signature;
            }
            return false;
        }

        let idx = self.edges.len();
        self.outgoing.entry(edge.from.symbol).or_default().push(idx);
        if let Some(node) = edge.to.node() {
            self.incoming.entry(node.symbol).or_default().push(idx);
        }
        self.index.insert(key, idx);
        self.edges.push(edge);
        true
    }

    /// All edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges from the symbol or any of its members.
    pub fn outgoing(&self, symbol: SymbolId) -> impl Iterator<Item = &Edge> + '_ {
        self.lookup(&self.outgoing, symbol)
    }

    /// Edges from exactly `node`.
    pub fn edges_from(&self, node: Node) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing(node.symbol).filter(move |e| e.from == node)
    }

    /// Edges into the symbol or any of its members.
    pub fn incoming(&self, symbol: SymbolId) -> impl Iterator<Item = &Edge> + '_ {
        self.lookup(&self.incoming, symbol)
    }

    /// Number of edges with an unresolved dependency.
    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.edges.iter().filter(|e| e.to.is_unresolved()).count()
    }

    fn lookup<'g>(
        &'g self,
        adjacency: &'g HashMap<SymbolId, Vec<usize>>,
        symbol: SymbolId,
    ) -> impl Iterator<Item = &'g Edge> + 'g {
        adjacency
            .get(&symbol)
            .into_iter()
            .flatten()
            .map(|&idx| &self.edges[idx])
    }
}
