//! Reachability and structural queries over a built graph.
//!
//! ## Closures
//!
//! | Query | Follows | Unit of expansion |
//! |-------|---------|-------------------|
//! | Coarse | every edge | whole symbols (member targets collapse to owners) |
//! | Fine | signature-site edges only | symbol headers and single members |
//!
//! In a fine closure the seed contributes every edge of its header and of
//! its members, bodies included. A dependency reached as a whole symbol
//! contributes its header (inheritance, type-parameter constraints); one
//! reached through a member contributes that member's signature plus its
//! owner's header. Both
//! traversals expand each unit once, and both report symbol names in
//! discovery order, so the fine closure is always a subset of the coarse one.
//!
//! The seed itself appears in a closure only when it is reached again
//! through a cycle.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::error::UnknownSymbolError;
use crate::graph::DependencyGraph;
use crate::symbols::SymbolTable;
use crate::types::{
    Cycle, DependencyKind, Edge, MemberKind, Node, Site, SymbolId, SymbolKind, SymbolSpace, Target,
};

/// All member kinds, for member-qualified seeds.
const ANY_MEMBER: &[MemberKind] = &[
    MemberKind::Method,
    MemberKind::Property,
    MemberKind::ClassConstant,
    MemberKind::TypeConstant,
    MemberKind::EnumCase,
];

/// The transitive dependencies of a seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Closure {
    /// The seed as given
    pub seed: String,
    /// Reached symbols in discovery order
    pub symbols: Vec<String>,
    /// Unresolved names met along the way, in discovery order
    pub unresolved: Vec<String>,
}

/// A symbol that directly depends on a queried symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependent {
    /// Dependent symbol name
    pub symbol: String,
    /// Kinds of the edges involved, sorted
    pub kinds: Vec<DependencyKind>,
}

/// A resolved query seed.
///
/// For an inherited member (`Derived::inherited`) `symbol` is the queried
/// class while `node` points at the ancestor that declares the member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    /// Symbol named by the query
    pub symbol: SymbolId,
    /// The symbol itself, or the member as declared
    pub node: Node,
}

impl Seed {
    /// The ancestor declaring a member seed, when it is not the queried
    /// symbol.
    #[must_use]
    pub fn inherited_from(&self) -> Option<SymbolId> {
        (self.node.symbol != self.symbol).then_some(self.node.symbol)
    }
}

/// Summary counts for a built graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Live symbols, builtin stubs included
    pub symbols: usize,
    /// Live symbols by kind
    pub symbols_by_kind: BTreeMap<SymbolKind, usize>,
    /// Distinct edges
    pub edges: usize,
    /// Edges by kind
    pub edges_by_kind: BTreeMap<DependencyKind, usize>,
    /// Edges whose dependency matched nothing
    pub unresolved_edges: usize,
    /// Edges whose dependency is a builtin stub
    pub external_edges: usize,
}

/// Resolve a query seed: `Name`, `Name::member`, or a space-qualified
/// `function:Name` / `constant:Name` / `type:Name`.
///
/// # Errors
///
/// Returns `UnknownSymbolError` if nothing matches.
pub fn resolve_seed(table: &SymbolTable, seed: &str) -> Result<Seed, UnknownSymbolError> {
    let unknown = || UnknownSymbolError {
        name: seed.to_string(),
    };

    let (space, name) = match seed.split_once(':') {
        Some(("function", rest)) => (Some(SymbolSpace::Function), rest),
        Some(("constant", rest)) => (Some(SymbolSpace::Constant), rest),
        Some(("type", rest)) => (Some(SymbolSpace::Type), rest),
        _ => (None, seed),
    };

    let (symbol_name, member_name) = match name.rsplit_once("::") {
        Some((symbol, member)) => (symbol, Some(member)),
        None => (name, None),
    };

    let symbol = match (space, member_name) {
        (Some(space), _) => table.lookup(symbol_name, space),
        (None, Some(_)) => table.lookup(symbol_name, SymbolSpace::Type),
        (None, None) => table.lookup_any(symbol_name),
    }
    .ok_or_else(unknown)?;

    let node = match member_name {
        None => Node::symbol(symbol),
        Some(member) => table
            .find_member(symbol, member.trim_start_matches('$'), ANY_MEMBER)
            .map(|(owner, member)| Node::member(owner, member))
            .ok_or_else(unknown)?,
    };
    Ok(Seed { symbol, node })
}

/// Every symbol the seed depends on, following all edges.
///
/// # Errors
///
/// Returns `UnknownSymbolError` if the seed names nothing.
pub fn coarse_closure(
    table: &SymbolTable,
    graph: &DependencyGraph,
    seed: &str,
) -> Result<Closure, UnknownSymbolError> {
    let start = resolve_seed(table, seed)?;
    let mut walk = Walk::default();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    // A member seed expands that member and its owner's header first. An
    // inherited member also brings in the declaring ancestor and the
    // queried symbol's own header.
    let initial: Vec<&Edge> = match start.node.member {
        None => graph.outgoing(start.symbol).collect(),
        Some(_) => graph
            .edges_from(start.node)
            .chain(graph.edges_from(Node::symbol(start.node.symbol)))
            .chain(
                start
                    .inherited_from()
                    .into_iter()
                    .flat_map(|_| graph.edges_from(Node::symbol(start.symbol))),
            )
            .collect(),
    };

    if let Some(owner) = start.inherited_from() {
        walk.record(table, owner);
        visited.insert(owner);
        queue.push_back(owner);
    }
    for edge in initial {
        if let Some(node) = walk.reach(table, edge)
            && visited.insert(node.symbol)
        {
            queue.push_back(node.symbol);
        }
    }

    while let Some(symbol) = queue.pop_front() {
        for edge in graph.outgoing(symbol) {
            if let Some(node) = walk.reach(table, edge)
                && visited.insert(node.symbol)
            {
                queue.push_back(node.symbol);
            }
        }
    }

    Ok(walk.finish(seed))
}

/// The symbols needed to declare the seed: everything the seed itself
/// references, then only the signatures of what it reaches, at member
/// granularity.
///
/// # Errors
///
/// Returns `UnknownSymbolError` if the seed names nothing.
pub fn fine_closure(
    table: &SymbolTable,
    graph: &DependencyGraph,
    seed: &str,
) -> Result<Closure, UnknownSymbolError> {
    let start = resolve_seed(table, seed)?;
    let mut walk = Walk::default();
    let mut expanded: HashSet<Node> = HashSet::new();
    let mut queue: VecDeque<Node> = VecDeque::new();

    let mut seed_units = vec![Node::symbol(start.symbol)];
    match start.node.member {
        Some(_) => seed_units.push(start.node),
        None => seed_units.extend(
            table
                .get(start.symbol)
                .member_ids()
                .map(|member| Node::member(start.symbol, member)),
        ),
    }
    queue.extend(seed_units.iter().copied());
    let seed_units: HashSet<Node> = seed_units.into_iter().collect();

    // The ancestor declaring an inherited member seed contributes its header.
    if let Some(owner) = start.inherited_from() {
        walk.record(table, owner);
        queue.push_back(Node::symbol(owner));
    }

    while let Some(unit) = queue.pop_front() {
        if !expanded.insert(unit) {
            continue;
        }
        let whole = seed_units.contains(&unit);
        for edge in graph
            .edges_from(unit)
            .filter(|e| whole || e.site == Site::Signature)
        {
            let Some(node) = walk.reach(table, edge) else {
                continue;
            };
            if node.member.is_some() {
                queue.push_back(Node::symbol(node.symbol));
            }
            queue.push_back(node);
        }
    }

    Ok(walk.finish(seed))
}

/// Direct dependents of a symbol (or of one member), grouped by dependent
/// symbol and sorted by name. Edges internal to the seed's own symbol are
/// skipped.
///
/// # Errors
///
/// Returns `UnknownSymbolError` if the seed names nothing.
pub fn dependents(
    table: &SymbolTable,
    graph: &DependencyGraph,
    seed: &str,
) -> Result<Vec<Dependent>, UnknownSymbolError> {
    let start = resolve_seed(table, seed)?;
    let mut grouped: BTreeMap<String, BTreeSet<DependencyKind>> = BTreeMap::new();

    let target = start.node;
    for edge in graph.incoming(target.symbol) {
        if edge.from.symbol == target.symbol {
            continue;
        }
        let hits = match (target.member, edge.to.node()) {
            (None, _) => true,
            (Some(member), Some(node)) => node.member == Some(member),
            (Some(_), None) => false,
        };
        if hits {
            grouped
                .entry(table.get(edge.from.symbol).name.clone())
                .or_default()
                .insert(edge.kind);
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(symbol, kinds)| Dependent {
            symbol,
            kinds: kinds.into_iter().collect(),
        })
        .collect())
}

/// Strongly connected components of the symbol-level graph.
///
/// Multi-symbol components are always reported; a single symbol only when
/// `include_self_loops` is set and it has an edge to itself. Symbols inside
/// a cycle are sorted by name, cycles by their first symbol.
#[must_use]
pub fn cycles(
    table: &SymbolTable,
    graph: &DependencyGraph,
    include_self_loops: bool,
) -> Vec<Cycle> {
    let mut projected: DiGraph<SymbolId, ()> = DiGraph::new();
    let mut nodes: HashMap<SymbolId, NodeIndex> = HashMap::new();
    for (id, _) in table.iter() {
        nodes.insert(id, projected.add_node(id));
    }

    let mut seen = HashSet::new();
    let mut self_loops = HashSet::new();
    for edge in graph.edges() {
        let Some(to) = edge.to.node() else {
            continue;
        };
        let (from, to) = (edge.from.symbol, to.symbol);
        if from == to {
            self_loops.insert(from);
        }
        if let (Some(&a), Some(&b)) = (nodes.get(&from), nodes.get(&to))
            && seen.insert((a, b))
        {
            projected.add_edge(a, b, ());
        }
    }

    let mut found: Vec<Cycle> = tarjan_scc(&projected)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || (include_self_loops && self_loops.contains(&projected[component[0]]))
        })
        .map(|component| {
            let mut symbols: Vec<String> = component
                .iter()
                .map(|&idx| table.get(projected[idx]).name.clone())
                .collect();
            symbols.sort();
            Cycle { symbols }
        })
        .collect();
    found.sort_by(|a, b| a.symbols.cmp(&b.symbols));
    found
}

/// Symbol and edge counts.
#[must_use]
pub fn stats(table: &SymbolTable, graph: &DependencyGraph) -> GraphStats {
    let mut stats = GraphStats {
        symbols: table.len(),
        edges: graph.len(),
        ..GraphStats::default()
    };

    for (_, symbol) in table.iter() {
        *stats.symbols_by_kind.entry(symbol.kind).or_default() += 1;
    }
    for edge in graph.edges() {
        *stats.edges_by_kind.entry(edge.kind).or_default() += 1;
        match edge.to.node() {
            None => stats.unresolved_edges += 1,
            Some(node) if table.get(node.symbol).is_builtin => stats.external_edges += 1,
            Some(_) => {}
        }
    }
    stats
}

/// Result accumulator shared by both closures.
#[derive(Default)]
struct Walk {
    symbols: Vec<String>,
    reached: HashSet<SymbolId>,
    unresolved: Vec<String>,
    unresolved_seen: HashSet<String>,
}

impl Walk {
    /// Record a reached symbol once, in discovery order.
    fn record(&mut self, table: &SymbolTable, symbol: SymbolId) {
        if self.reached.insert(symbol) {
            self.symbols.push(table.get(symbol).name.clone());
        }
    }

    /// Record the edge's dependency; returns it when it resolved.
    fn reach(&mut self, table: &SymbolTable, edge: &Edge) -> Option<Node> {
        match &edge.to {
            Target::Resolved(node) => {
                self.record(table, node.symbol);
                Some(*node)
            }
            Target::Unresolved(name) => {
                if self.unresolved_seen.insert(name.clone()) {
                    self.unresolved.push(name.clone());
                }
                None
            }
        }
    }

    fn finish(self, seed: &str) -> Closure {
        Closure {
            seed: seed.to_string(),
            symbols: self.symbols,
            unresolved: self.unresolved,
        }
    }
}
