//! Symbol table: fully-qualified names to declaration records.
//!
//! Built once per analyzed file set in two steps:
//!
//! 1. **Declare**: every declaration is converted to a [`Symbol`] and bound
//!    in its symbol space. A later declaration of the same name shadows the
//!    earlier one.
//! 2. **Finalize**: supertype names are resolved into arena indices and
//!    overriding methods are linked to the ancestor member they override.
//!
//! After finalization the table is read-only and shared across the reference
//! collection workers.
//!
//! ## Name resolution
//!
//! | Written | Resolves to |
//! |---------|-------------|
//! | `\A\B` | exactly `A\B` |
//! | `self`, `static`, `this` | the enclosing class |
//! | `parent` | the first `extends` of the enclosing class |
//! | `B` inside namespace `A` | `A\B`, else the global `B` |

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use crate::ast::{ClassKind, Declaration, Hint, MemberDecl, SourceFile};
use crate::config::Builtins;
use crate::error::DuplicateSymbolError;
use crate::types::{
    Location, Member, MemberId, MemberKind, Node, Symbol, SymbolId, SymbolKind, SymbolSpace,
};

/// Outcome of resolving a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Bound to a live symbol
    Symbol(SymbolId),
    /// Bound to nothing; carries the name as written (without leading `\`)
    Unresolved(String),
}

impl Resolution {
    /// The resolved symbol, if any.
    #[must_use]
    pub fn symbol(&self) -> Option<SymbolId> {
        match self {
            Self::Symbol(id) => Some(*id),
            Self::Unresolved(_) => None,
        }
    }
}

/// Lexical context a name is resolved in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'a> {
    /// Namespace of the referencing declaration
    pub namespace: Option<&'a str>,
    /// Enclosing class, for `self`, `static`, `this` and `parent`
    pub class: Option<SymbolId>,
}

impl<'a> Scope<'a> {
    /// Scope of a declaration in `namespace`, inside `class` if any.
    #[must_use]
    pub fn new(namespace: Option<&'a str>, class: Option<SymbolId>) -> Self {
        Self { namespace, class }
    }
}

/// Arena of declared symbols with per-space name indices.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    /// Cleared when a later declaration shadows the symbol
    live: Vec<bool>,
    index: HashMap<(SymbolSpace, String), SymbolId>,
    /// Resolved supertypes: extends, implements, trait uses, require extends
    parents: Vec<Vec<SymbolId>>,
}

impl SymbolTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a symbol, refusing names already bound in the same space.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSymbolError` if the name is taken; the table is left
    /// unchanged.
    pub fn register(&mut self, symbol: Symbol) -> Result<SymbolId, DuplicateSymbolError> {
        if let Some(existing) = self.lookup(&symbol.name, symbol.kind.space()) {
            return Err(self.duplicate_error(existing, &symbol));
        }
        Ok(self.push(symbol))
    }

    /// Bind a symbol, shadowing any earlier binding of the name.
    ///
    /// Returns the new id and, when a user declaration was shadowed, the
    /// duplicate to report. Shadowing a builtin stub is not a duplicate.
    pub fn declare(&mut self, symbol: Symbol) -> (SymbolId, Option<DuplicateSymbolError>) {
        let mut duplicate = None;
        if let Some(existing) = self.lookup(&symbol.name, symbol.kind.space()) {
            self.live[existing.0] = false;
            if !self.get(existing).is_builtin {
                let dup = self.duplicate_error(existing, &symbol);
                warn!(
                    symbol = %dup.name,
                    existing = %dup.existing_location,
                    incoming = %dup.incoming_location,
                    "Duplicate declaration, later one shadows"
                );
                duplicate = Some(dup);
            }
        }

        (self.push(symbol), duplicate)
    }

    /// Register configured builtin stubs.
    pub fn register_builtins(&mut self, builtins: &Builtins) {
        let stubs = builtins
            .classes
            .iter()
            .map(|n| (n, SymbolKind::Class))
            .chain(builtins.functions.iter().map(|n| (n, SymbolKind::Function)))
            .chain(builtins.constants.iter().map(|n| (n, SymbolKind::Constant)));

        for (name, kind) in stubs {
            let name = name.trim_start_matches('\\');
            if self.lookup(name, kind.space()).is_none() {
                self.push(Symbol::builtin(name, kind));
            }
        }
    }

    /// Declare every top-level declaration of `file`.
    ///
    /// Returns the declarations paired with their ids, in source order, plus
    /// any duplicates found.
    pub fn declare_file<'f>(
        &mut self,
        file: &'f SourceFile,
    ) -> (Vec<(SymbolId, &'f Declaration)>, Vec<DuplicateSymbolError>) {
        let mut declared = Vec::with_capacity(file.declarations.len());
        let mut duplicates = Vec::new();

        for decl in &file.declarations {
            let (id, duplicate) = self.declare(symbol_from_declaration(file, decl));
            declared.push((id, decl));
            duplicates.extend(duplicate);
        }

        (declared, duplicates)
    }

    /// Resolve supertypes and link overriding methods.
    ///
    /// Must run after every declaration is registered and before references
    /// are resolved.
    pub fn finalize(&mut self) {
        for idx in 0..self.symbols.len() {
            if !self.live[idx] || !self.symbols[idx].kind.is_classish() {
                continue;
            }
            let symbol = &self.symbols[idx];
            let scope = Scope::new(symbol.namespace.as_deref(), Some(SymbolId(idx)));
            let parents: Vec<SymbolId> = symbol
                .extends
                .iter()
                .chain(&symbol.implements)
                .chain(&symbol.uses)
                .chain(&symbol.requires_extends)
                .filter_map(|name| self.resolve(name, SymbolSpace::Type, &scope).symbol())
                .filter(|parent| parent.0 != idx)
                .collect();
            self.parents[idx] = parents;
        }

        let mut links = Vec::new();
        for (id, symbol) in self.iter() {
            for member_id in symbol.member_ids() {
                let member = symbol.member_at(member_id);
                if member.kind != MemberKind::Method {
                    continue;
                }
                let overridden = self.parents(id).iter().find_map(|&parent| {
                    self.find_member(parent, &member.name, &[MemberKind::Method])
                });
                if let Some(target) = overridden {
                    links.push((id, member_id, target));
                }
            }
        }

        debug!(
            symbols = self.len(),
            overrides = links.len(),
            "Finalized symbol table"
        );

        for (id, member_id, target) in links {
            self.symbols[id.0].members[member_id.0].overrides = Some(target);
        }
    }

    /// Access a symbol by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this table.
    #[must_use]
    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    /// Whether the symbol is still bound (not shadowed by a later duplicate).
    #[must_use]
    pub fn is_live(&self, id: SymbolId) -> bool {
        self.live[id.0]
    }

    /// Iterate live symbols in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.live[*idx])
            .map(|(idx, symbol)| (SymbolId(idx), symbol))
    }

    /// Number of live symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.iter().filter(|live| **live).count()
    }

    /// Whether the table has no live symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exact lookup of a fully-qualified name in one space.
    #[must_use]
    pub fn lookup(&self, name: &str, space: SymbolSpace) -> Option<SymbolId> {
        let name = name.trim_start_matches('\\');
        self.index.get(&(space, name.to_string())).copied()
    }

    /// Exact lookup in any space, preferring types, then functions, then
    /// constants.
    #[must_use]
    pub fn lookup_any(&self, name: &str) -> Option<SymbolId> {
        [SymbolSpace::Type, SymbolSpace::Function, SymbolSpace::Constant]
            .into_iter()
            .find_map(|space| self.lookup(name, space))
    }

    /// Resolve a name as written at a reference site.
    #[must_use]
    pub fn resolve(&self, name: &str, space: SymbolSpace, scope: &Scope<'_>) -> Resolution {
        if space == SymbolSpace::Type {
            match name {
                "self" | "static" | "this" => {
                    return scope
                        .class
                        .map_or_else(
                            || Resolution::Unresolved(name.to_string()),
                            Resolution::Symbol,
                        );
                }
                "parent" => {
                    return scope
                        .class
                        .and_then(|class| self.parent_class(class))
                        .map_or_else(
                            || Resolution::Unresolved(name.to_string()),
                            Resolution::Symbol,
                        );
                }
                _ => {}
            }
        }

        if let Some(absolute) = name.strip_prefix('\\') {
            return self
                .lookup(absolute, space)
                .map_or_else(|| Resolution::Unresolved(absolute.to_string()), Resolution::Symbol);
        }

        if let Some(ns) = scope.namespace.filter(|ns| !ns.is_empty())
            && let Some(id) = self.lookup(&format!("{ns}\\{name}"), space)
        {
            return Resolution::Symbol(id);
        }

        self.lookup(name, space)
            .map_or_else(|| Resolution::Unresolved(name.to_string()), Resolution::Symbol)
    }

    /// The class named by the first `extends` clause of `class`.
    #[must_use]
    pub fn parent_class(&self, class: SymbolId) -> Option<SymbolId> {
        let symbol = self.get(class);
        let first = symbol.extends.first()?;
        let scope = Scope::new(symbol.namespace.as_deref(), None);
        self.resolve(first, SymbolSpace::Type, &scope)
            .symbol()
            .filter(|parent| *parent != class)
    }

    /// Resolved supertypes of a symbol (empty before `finalize`).
    #[must_use]
    pub fn parents(&self, id: SymbolId) -> &[SymbolId] {
        &self.parents[id.0]
    }

    /// Every transitive supertype of `id`, nearest first, excluding `id`.
    #[must_use]
    pub fn ancestors(&self, id: SymbolId) -> Vec<SymbolId> {
        let mut seen = HashSet::from([id]);
        let mut queue: VecDeque<SymbolId> = self.parents(id).iter().copied().collect();
        let mut out = Vec::new();

        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            queue.extend(self.parents(next).iter().copied());
        }
        out
    }

    /// Find a member by static receiver type: `class` first, then its
    /// ancestors breadth-first. Returns the first declaring class.
    #[must_use]
    pub fn find_member(
        &self,
        class: SymbolId,
        name: &str,
        kinds: &[MemberKind],
    ) -> Option<(SymbolId, MemberId)> {
        std::iter::once(class)
            .chain(self.ancestors(class))
            .find_map(|owner| self.get(owner).member(name, kinds).map(|m| (owner, m)))
    }

    /// The ancestor member a method overrides, if any.
    #[must_use]
    pub fn overrides(&self, symbol: SymbolId, member: MemberId) -> Option<(SymbolId, MemberId)> {
        self.get(symbol).members.get(member.0)?.overrides
    }

    /// Display name of a node: `Name` or `Name::member`.
    #[must_use]
    pub fn node_name(&self, node: Node) -> String {
        let symbol = self.get(node.symbol);
        match node.member {
            Some(member) => format!("{}::{}", symbol.name, symbol.member_at(member).name),
            None => symbol.name.clone(),
        }
    }

    fn push(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        self.index
            .insert((symbol.kind.space(), symbol.name.clone()), id);
        self.symbols.push(symbol);
        self.live.push(true);
        self.parents.push(Vec::new());
        id
    }

    fn duplicate_error(&self, existing: SymbolId, incoming: &Symbol) -> DuplicateSymbolError {
        let existing = self.get(existing);
        DuplicateSymbolError {
            name: incoming.name.clone(),
            existing: existing.kind,
            existing_location: existing.location.clone(),
            incoming: incoming.kind,
            incoming_location: incoming.location.clone(),
        }
    }
}

/// Fully-qualified name of a declaration in `namespace`.
#[must_use]
pub fn qualify(namespace: Option<&str>, name: &str) -> String {
    match namespace.filter(|ns| !ns.is_empty()) {
        Some(ns) => format!("{ns}\\{name}"),
        None => name.trim_start_matches('\\').to_string(),
    }
}

/// Build the symbol record for a declaration.
#[must_use]
pub fn symbol_from_declaration(file: &SourceFile, decl: &Declaration) -> Symbol {
    let namespace = file.namespace.as_deref();
    let location = Location::new(file.path.clone(), decl.line());
    let name = qualify(namespace, decl.name());

    let mut symbol = match decl {
        Declaration::Class(class) => {
            let kind = match class.kind {
                ClassKind::Interface => SymbolKind::Interface,
                ClassKind::Trait => SymbolKind::Trait,
                ClassKind::Class if class.is_abstract => SymbolKind::AbstractClass,
                ClassKind::Class => SymbolKind::Class,
            };
            let mut symbol = Symbol::new(name, kind, location);
            symbol.is_final = class.is_final;
            symbol.type_params = class.type_params.iter().map(|p| p.name.clone()).collect();
            symbol.extends = hint_names(&class.extends);
            symbol.implements = hint_names(&class.implements);
            symbol.requires_extends = hint_names(&class.requires_extends);
            symbol.uses = hint_names(&class.uses);
            symbol.members = class.members.iter().map(member_from_declaration).collect();
            symbol
        }
        Declaration::Enum(decl) => {
            let mut symbol = Symbol::new(name, SymbolKind::Enum, location);
            symbol.members = decl
                .cases
                .iter()
                .map(|case| Member::new(case.name.clone(), MemberKind::EnumCase))
                .collect();
            symbol
        }
        Declaration::Function(function) => {
            let mut symbol = Symbol::new(name, SymbolKind::Function, location);
            symbol.type_params = function.type_params.iter().map(|p| p.name.clone()).collect();
            symbol
        }
        Declaration::Constant(_) => Symbol::new(name, SymbolKind::Constant, location),
        Declaration::TypeAlias(alias) => {
            let mut symbol = Symbol::new(name, SymbolKind::TypeAlias, location);
            symbol.type_params = alias.type_params.iter().map(|p| p.name.clone()).collect();
            symbol.alias_of = Some(alias.target.clone());
            symbol
        }
    };
    symbol.namespace = namespace.map(str::to_string);
    symbol
}

fn member_from_declaration(decl: &MemberDecl) -> Member {
    match decl {
        MemberDecl::Method(method) => {
            let mut member = Member::new(method.name.clone(), MemberKind::Method);
            member.is_static = method.is_static;
            member.is_abstract = method.is_abstract || method.body.is_none();
            member.visibility = method.visibility;
            member.hint.clone_from(&method.return_type);
            member
        }
        MemberDecl::Property(property) => {
            let mut member = Member::new(property.name.clone(), MemberKind::Property);
            member.is_static = property.is_static;
            member.visibility = property.visibility;
            member.hint.clone_from(&property.hint);
            member
        }
        MemberDecl::Constant(constant) => {
            let mut member = Member::new(constant.name.clone(), MemberKind::ClassConstant);
            member.is_abstract = constant.value.is_none();
            member.hint.clone_from(&constant.hint);
            member
        }
        MemberDecl::TypeConstant(type_const) => {
            let mut member = Member::new(type_const.name.clone(), MemberKind::TypeConstant);
            member.is_abstract = type_const.is_abstract || type_const.value.is_none();
            member.hint = type_const
                .value
                .clone()
                .or_else(|| type_const.constraint.clone());
            member
        }
    }
}

fn hint_names(hints: &[Hint]) -> Vec<String> {
    hints
        .iter()
        .filter_map(|hint| match hint {
            Hint::Named { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}
