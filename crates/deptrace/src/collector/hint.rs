//! Type mentions.

use crate::ast::{Hint, ShapeKey};
use crate::symbols::{Resolution, Scope};
use crate::types::{
    DependencyKind, MemberId, MemberKind, Node, SymbolId, SymbolKind, SymbolSpace, Target,
};

use super::Collector;

/// Names that denote language types rather than declarations.
const TYPE_KEYWORDS: &[&str] = &[
    "arraykey",
    "array",
    "bool",
    "boolean",
    "classname",
    "darray",
    "dict",
    "dynamic",
    "float",
    "double",
    "int",
    "integer",
    "keyset",
    "mixed",
    "nonnull",
    "noreturn",
    "nothing",
    "null",
    "num",
    "resource",
    "string",
    "this",
    "tuple",
    "typename",
    "varray",
    "varray_or_darray",
    "vec",
    "vec_or_dict",
    "void",
    "_",
];

/// Whether `name` is a language type keyword (`int`, `keyset`, `classname`,
/// ...). An `HH\` prefix is ignored.
#[must_use]
pub fn is_type_keyword(name: &str) -> bool {
    let bare = name.trim_start_matches('\\');
    let bare = bare.strip_prefix("HH\\").unwrap_or(bare);
    TYPE_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(bare))
}

impl Collector<'_> {
    /// Record every type mentioned by `hint`.
    pub(crate) fn hint(&mut self, hint: &Hint) {
        match hint {
            Hint::Named { name, args } => {
                self.type_mention(name);
                for arg in args {
                    self.hint(arg);
                }
            }
            Hint::Nullable { inner } => self.hint(inner),
            Hint::Tuple { elements } => {
                for element in elements {
                    self.hint(element);
                }
            }
            Hint::Shape { fields } => {
                for field in fields {
                    if let ShapeKey::ClassConst { class, name } = &field.key {
                        self.class_constant(class, name);
                    }
                    self.hint(&field.hint);
                }
            }
            Hint::Function { params, ret } => {
                for param in params {
                    self.hint(param);
                }
                self.hint(ret);
            }
            Hint::Access { root, path } => self.type_constant_chain(root, path),
            Hint::This => {}
        }
    }

    /// `UsesType` on a named type, expanding aliases.
    pub(crate) fn type_mention(&mut self, name: &str) {
        if self.is_generic(name) || is_type_keyword(name) {
            return;
        }
        match self.resolve_type(name) {
            Resolution::Symbol(id) => {
                self.push(Target::Resolved(Node::symbol(id)), DependencyKind::UsesType);
                if self.table.get(id).kind == SymbolKind::TypeAlias {
                    self.expand_alias(id);
                }
            }
            Resolution::Unresolved(name) => {
                self.push(Target::Unresolved(name), DependencyKind::UsesType);
            }
        }
    }

    pub(crate) fn is_generic(&self, name: &str) -> bool {
        self.generics.iter().any(|g| g == name)
    }

    /// Record the types named by an alias target, in the alias's own scope.
    fn expand_alias(&mut self, alias: SymbolId) {
        let table = self.table;
        let symbol = table.get(alias);
        let Some(target) = &symbol.alias_of else {
            return;
        };
        if !self.expanding.insert(alias) {
            return;
        }

        let saved_scope = std::mem::replace(
            &mut self.scope,
            Scope::new(symbol.namespace.as_deref(), None),
        );
        // Only the alias's own parameters are in scope inside its target
        let saved_generics = std::mem::replace(&mut self.generics, symbol.type_params.clone());

        self.hint(target);

        self.generics = saved_generics;
        self.scope = saved_scope;
        self.expanding.remove(&alias);
    }

    /// `this::T::U`, `C::T`: one `UsesTypeConstant` per step, following each
    /// type constant's value to the class the next step is looked up in.
    fn type_constant_chain(&mut self, root: &Hint, path: &[String]) {
        let mut current = match root {
            Hint::This => self.scope.class,
            Hint::Named { name, .. } if self.is_generic(name) => return,
            Hint::Named { name, .. } => match self.resolve_type(name) {
                Resolution::Symbol(id) => {
                    if !matches!(name.as_str(), "self" | "static" | "this") {
                        self.push(Target::Resolved(Node::symbol(id)), DependencyKind::UsesType);
                    }
                    Some(id)
                }
                Resolution::Unresolved(name) => {
                    self.push(Target::Unresolved(name), DependencyKind::UsesType);
                    return;
                }
            },
            other => {
                self.hint(other);
                return;
            }
        };

        let mut prefix = match current {
            Some(id) => self.table.get(id).name.clone(),
            None => "this".to_string(),
        };

        for step in path {
            let found = current.and_then(|class| {
                self.table
                    .find_member(class, step, &[MemberKind::TypeConstant])
            });
            let Some((owner, member)) = found else {
                self.push(
                    Target::Unresolved(format!("{prefix}::{step}")),
                    DependencyKind::UsesTypeConstant,
                );
                return;
            };
            self.push(
                Target::Resolved(Node::member(owner, member)),
                DependencyKind::UsesTypeConstant,
            );

            current = self.type_constant_class(owner, member);
            prefix = format!("{prefix}::{step}");
        }
    }

    /// The class a type constant's value (or constraint) names, if any.
    fn type_constant_class(&self, owner: SymbolId, member: MemberId) -> Option<SymbolId> {
        let symbol = self.table.get(owner);
        let Some(Hint::Named { name, .. }) = &symbol.member_at(member).hint else {
            return None;
        };
        if is_type_keyword(name) {
            return None;
        }
        let scope = Scope::new(symbol.namespace.as_deref(), Some(owner));
        self.table
            .resolve(name, SymbolSpace::Type, &scope)
            .symbol()
    }
}
