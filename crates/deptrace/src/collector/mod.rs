//! Reference collection: declaration ASTs to outbound dependency edges.
//!
//! One [`Collector`] walks one declaration and records every named-symbol
//! reference it finds, tagged with a [`DependencyKind`] and the [`Site`] it
//! came from. Names are resolved against the finalized, read-only
//! [`SymbolTable`] as they are found; a name that matches nothing is kept as
//! an [`Target::Unresolved`] target.
//!
//! The walk is split by syntax:
//! - `hint`: type mentions, type-constant chains, alias expansion
//! - `expr`: expressions, statements and local receiver typing
//!
//! Edges are returned in discovery order and may contain duplicates; the
//! graph deduplicates on insertion.

mod expr;
mod hint;

use std::collections::{HashMap, HashSet};

use crate::ast::{
    ClassDecl, Declaration, EnumDecl, FunctionDecl, Hint, MemberDecl, Param, Stmt, TypeParam,
};
use crate::config::ConstructionPolicy;
use crate::symbols::{Resolution, Scope, SymbolTable};
use crate::types::{DependencyKind, Edge, MemberId, Node, Site, SymbolId, SymbolSpace, Target};

pub use hint::is_type_keyword;

/// Collect the outbound edges of one declaration.
///
/// `id` must be the symbol `decl` was declared as.
#[must_use]
pub fn collect(
    table: &SymbolTable,
    policy: ConstructionPolicy,
    id: SymbolId,
    decl: &Declaration,
) -> Vec<Edge> {
    let mut collector = Collector::new(table, policy, id);
    match decl {
        Declaration::Class(class) => collector.class(class),
        Declaration::Enum(decl) => collector.enumeration(decl),
        Declaration::Function(function) => collector.function(function),
        Declaration::Constant(constant) => {
            if let Some(hint) = &constant.hint {
                collector.hint(hint);
            }
            collector.expr(&constant.value);
        }
        Declaration::TypeAlias(alias) => {
            collector.with_generics(&alias.type_params, |c| {
                if let Some(constraint) = &alias.constraint {
                    c.hint(constraint);
                }
                c.hint(&alias.target);
            });
        }
    }
    collector.edges
}

/// Walk state for one declaration.
pub(crate) struct Collector<'a> {
    pub(crate) table: &'a SymbolTable,
    pub(crate) policy: ConstructionPolicy,
    /// Namespace and enclosing class names resolve in
    pub(crate) scope: Scope<'a>,
    /// Node edges are recorded from
    pub(crate) from: Node,
    pub(crate) site: Site,
    /// In-scope generic parameter names, innermost last
    pub(crate) generics: Vec<String>,
    /// Static class types of local variables (names without `$`)
    pub(crate) locals: HashMap<String, SymbolId>,
    /// Aliases currently being expanded
    pub(crate) expanding: HashSet<SymbolId>,
    pub(crate) edges: Vec<Edge>,
}

impl<'a> Collector<'a> {
    fn new(table: &'a SymbolTable, policy: ConstructionPolicy, id: SymbolId) -> Self {
        let symbol = table.get(id);
        let class = symbol.kind.is_classish().then_some(id);
        Self {
            table,
            policy,
            scope: Scope::new(symbol.namespace.as_deref(), class),
            from: Node::symbol(id),
            site: Site::Signature,
            generics: Vec::new(),
            locals: HashMap::new(),
            expanding: HashSet::new(),
            edges: Vec::new(),
        }
    }

    /// Record an edge from the current node at the current site.
    pub(crate) fn push(&mut self, to: Target, kind: DependencyKind) {
        self.edges.push(Edge {
            from: self.from,
            to,
            kind,
            site: self.site,
        });
    }

    /// Resolve a class-like name in the current scope.
    pub(crate) fn resolve_type(&self, name: &str) -> Resolution {
        self.table.resolve(name, SymbolSpace::Type, &self.scope)
    }

    /// Target for a whole-symbol reference of `name` in `space`.
    pub(crate) fn symbol_target(&self, name: &str, space: SymbolSpace) -> Target {
        match self.table.resolve(name, space, &self.scope) {
            Resolution::Symbol(id) => Target::Resolved(Node::symbol(id)),
            Resolution::Unresolved(name) => Target::Unresolved(name),
        }
    }

    /// Run `f` with `params` in scope as generic names.
    pub(crate) fn with_generics(&mut self, params: &[TypeParam], f: impl FnOnce(&mut Self)) {
        let depth = self.generics.len();
        self.generics.extend(params.iter().map(|p| p.name.clone()));
        for param in params {
            for constraint in &param.constraints {
                self.hint(constraint);
            }
        }
        f(self);
        self.generics.truncate(depth);
    }

    fn class(&mut self, class: &ClassDecl) {
        let owner = self.from.symbol;
        self.with_generics(&class.type_params, |c| {
            c.supertypes(&class.extends, DependencyKind::Extends);
            c.supertypes(&class.implements, DependencyKind::Implements);
            c.supertypes(&class.requires_extends, DependencyKind::RequiresExtends);
            c.supertypes(&class.uses, DependencyKind::Extends);

            for (idx, member) in class.members.iter().enumerate() {
                c.from = Node::member(owner, MemberId(idx));
                c.member(member);
            }
            c.from = Node::symbol(owner);
        });
    }

    fn supertypes(&mut self, hints: &[Hint], kind: DependencyKind) {
        for hint in hints {
            match hint {
                Hint::Named { name, args } => {
                    let target = self.symbol_target(name, SymbolSpace::Type);
                    self.push(target, kind);
                    for arg in args {
                        self.hint(arg);
                    }
                }
                other => self.hint(other),
            }
        }
    }

    fn member(&mut self, member: &MemberDecl) {
        match member {
            MemberDecl::Method(method) => {
                self.with_generics(&method.type_params, |c| {
                    c.signature(&method.params, method.return_type.as_ref());
                    if let Some(body) = &method.body {
                        c.body(&method.params, body);
                    }
                });
            }
            MemberDecl::Property(property) => {
                if let Some(hint) = &property.hint {
                    self.hint(hint);
                }
                if let Some(default) = &property.default {
                    self.expr(default);
                }
            }
            MemberDecl::Constant(constant) => {
                if let Some(hint) = &constant.hint {
                    self.hint(hint);
                }
                if let Some(value) = &constant.value {
                    self.expr(value);
                }
            }
            MemberDecl::TypeConstant(type_const) => {
                if let Some(constraint) = &type_const.constraint {
                    self.hint(constraint);
                }
                if let Some(value) = &type_const.value {
                    self.hint(value);
                }
            }
        }
    }

    fn enumeration(&mut self, decl: &EnumDecl) {
        let owner = self.from.symbol;
        self.hint(&decl.base);
        if let Some(constraint) = &decl.constraint {
            self.hint(constraint);
        }
        for (idx, case) in decl.cases.iter().enumerate() {
            self.from = Node::member(owner, MemberId(idx));
            self.expr(&case.value);
        }
        self.from = Node::symbol(owner);
    }

    fn function(&mut self, function: &FunctionDecl) {
        self.with_generics(&function.type_params, |c| {
            c.signature(&function.params, function.return_type.as_ref());
            c.body(&function.params, &function.body);
        });
    }

    /// Parameter hints, parameter defaults and the return hint.
    fn signature(&mut self, params: &[Param], return_type: Option<&Hint>) {
        for param in params {
            if let Some(hint) = &param.hint {
                self.hint(hint);
            }
            if let Some(default) = &param.default {
                self.expr(default);
            }
        }
        if let Some(ret) = return_type {
            self.hint(ret);
        }
    }

    /// Body statements, with parameters typed as locals.
    fn body(&mut self, params: &[Param], body: &[Stmt]) {
        let saved_site = std::mem::replace(&mut self.site, Site::Body);
        let saved_locals = std::mem::take(&mut self.locals);
        self.bind_params(params);

        self.stmts(body);

        self.locals = saved_locals;
        self.site = saved_site;
    }
}
