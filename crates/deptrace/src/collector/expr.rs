//! Expressions, statements and local receiver typing.
//!
//! Receiver types are static and flow-insensitive: a local is typed by its
//! parameter hint, by `new T(...)`, by a property or method return hint, or
//! by assignment from another typed local. Anything else is unknown and
//! member accesses through it are recorded as unresolved.

use crate::ast::{Expr, Hint, Param, ShapeKey, Stmt};
use crate::config::ConstructionPolicy;
use crate::symbols::{Resolution, Scope};
use crate::types::{DependencyKind, MemberKind, Node, SymbolId, SymbolSpace, Target};

use super::Collector;
use super::hint::is_type_keyword;

/// Collection literal classes that are language constructs.
const COLLECTION_KEYWORDS: &[&str] = &["vec", "dict", "keyset", "varray", "darray", "array"];

/// Constant names that are literals.
const LITERAL_CONSTANTS: &[&str] = &["true", "false", "null"];

/// Static type of a member receiver.
enum Receiver {
    Class(SymbolId),
    /// Unknown; carries the label used in unresolved targets (`$x`)
    Unknown(String),
}

impl Collector<'_> {
    pub(crate) fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr { expr } | Stmt::Throw { value: expr } => self.expr(expr),
            Stmt::Return { value } => {
                if let Some(value) = value {
                    self.expr(value);
                }
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                self.expr(cond);
                self.stmts(then);
                self.stmts(otherwise);
            }
            Stmt::While { cond, body } => {
                self.expr(cond);
                self.stmts(body);
            }
            Stmt::Foreach {
                collection,
                key,
                value,
                body,
            } => {
                self.expr(collection);
                if let Some(key) = key {
                    self.locals.remove(key);
                }
                self.locals.remove(value);
                self.stmts(body);
            }
            Stmt::Switch { subject, cases } => {
                self.expr(subject);
                for case in cases {
                    if let Some(label) = &case.label {
                        self.expr(label);
                    }
                    self.stmts(&case.body);
                }
            }
            Stmt::Try {
                body,
                catches,
                finally,
            } => {
                self.stmts(body);
                for catch in catches {
                    self.type_mention(&catch.class);
                    match self.resolve_type(&catch.class) {
                        Resolution::Symbol(id) => {
                            self.locals.insert(catch.var.clone(), id);
                        }
                        Resolution::Unresolved(_) => {
                            self.locals.remove(&catch.var);
                        }
                    }
                    self.stmts(&catch.body);
                }
                self.stmts(finally);
            }
        }
    }

    /// Record every reference in `expr`.
    pub(crate) fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal { .. } | Expr::Var { .. } => {}
            Expr::Const { name } => {
                if LITERAL_CONSTANTS
                    .iter()
                    .any(|lit| lit.eq_ignore_ascii_case(name))
                {
                    return;
                }
                let target = self.symbol_target(name, SymbolSpace::Constant);
                self.push(target, DependencyKind::ReadsGlobalConstant);
            }
            Expr::ClassConst { class, name } if name == "class" => self.type_mention(class),
            Expr::ClassConst { class, name } => self.class_constant(class, name),
            Expr::StaticProp { class, name } => {
                let receiver = self.static_receiver(class);
                self.member_access(
                    receiver,
                    "::$",
                    name,
                    &[MemberKind::Property],
                    DependencyKind::ReadsStaticProperty,
                );
            }
            Expr::Prop { object, name } => {
                self.expr(object);
                let receiver = self.receiver(object);
                self.member_access(
                    receiver,
                    "->",
                    name,
                    &[MemberKind::Property],
                    DependencyKind::ReadsProperty,
                );
            }
            Expr::Call { name, targs, args } => {
                let target = self.symbol_target(name, SymbolSpace::Function);
                self.push(target, DependencyKind::CallsFunction);
                self.hints(targs);
                self.exprs(args);
            }
            Expr::MethodCall {
                object,
                method,
                args,
            } => {
                self.expr(object);
                let receiver = self.receiver(object);
                self.member_access(
                    receiver,
                    "->",
                    method,
                    &[MemberKind::Method],
                    DependencyKind::CallsMethod,
                );
                self.exprs(args);
            }
            Expr::StaticCall {
                class,
                method,
                args,
            } => {
                let receiver = self.static_receiver(class);
                self.member_access(
                    receiver,
                    "::",
                    method,
                    &[MemberKind::Method],
                    DependencyKind::CallsMethod,
                );
                self.exprs(args);
            }
            Expr::New { class, targs, args } => {
                self.instantiation(class);
                self.hints(targs);
                self.exprs(args);
            }
            Expr::Collection {
                class,
                targs,
                entries,
            } => {
                if !COLLECTION_KEYWORDS
                    .iter()
                    .any(|kw| kw.eq_ignore_ascii_case(class))
                {
                    self.type_mention(class);
                }
                self.hints(targs);
                for entry in entries {
                    if let Some(key) = &entry.key {
                        self.expr(key);
                    }
                    self.expr(&entry.value);
                }
            }
            Expr::Shape { fields } => {
                for field in fields {
                    if let ShapeKey::ClassConst { class, name } = &field.key {
                        self.class_constant(class, name);
                    }
                    self.expr(&field.value);
                }
            }
            Expr::Tuple { elements } => self.exprs(elements),
            Expr::Binary { lhs, rhs, .. } => {
                self.expr(lhs);
                self.expr(rhs);
            }
            Expr::Unary { operand, .. } => self.expr(operand),
            Expr::Assign { target, value } => {
                self.expr(value);
                if let Expr::Var { name } = target.as_ref() {
                    match self.infer(value) {
                        Some(class) => self.locals.insert(name.clone(), class),
                        None => self.locals.remove(name),
                    };
                } else {
                    self.expr(target);
                }
            }
            Expr::Index { base, index } => {
                self.expr(base);
                if let Some(index) = index {
                    self.expr(index);
                }
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.expr(cond);
                self.expr(then);
                self.expr(otherwise);
            }
            Expr::InstanceOf { operand, class } => {
                self.expr(operand);
                self.type_mention(class);
            }
            Expr::As { operand, hint } => {
                self.expr(operand);
                self.hint(hint);
            }
            Expr::Inout { operand } => self.expr(operand),
            Expr::Lambda {
                params,
                return_type,
                body,
            } => {
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
                let saved = self.locals.clone();
                self.bind_params(params);
                self.stmts(body);
                self.locals = saved;
            }
        }
    }

    fn exprs(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.expr(expr);
        }
    }

    fn hints(&mut self, hints: &[Hint]) {
        for hint in hints {
            self.hint(hint);
        }
    }

    /// Bind parameters with class hints as typed locals.
    pub(crate) fn bind_params(&mut self, params: &[Param]) {
        for param in params {
            let class = param
                .hint
                .as_ref()
                .filter(|_| !param.is_variadic)
                .and_then(|hint| self.hint_class(hint, &self.scope));
            match class {
                Some(class) => {
                    self.locals.insert(param.name.clone(), class);
                }
                None => {
                    self.locals.remove(&param.name);
                }
            }
        }
    }

    /// `C::NAME`: a class constant, or an enum case plus the enum itself.
    pub(crate) fn class_constant(&mut self, class: &str, name: &str) {
        let receiver = self.static_receiver(class);
        let Receiver::Class(class_id) = receiver else {
            self.member_access(
                receiver,
                "::",
                name,
                &[MemberKind::ClassConstant],
                DependencyKind::ReadsClassConstant,
            );
            return;
        };

        let found = self.table.find_member(
            class_id,
            name,
            &[MemberKind::ClassConstant, MemberKind::EnumCase],
        );
        match found {
            Some((owner, member))
                if self.table.get(owner).member_at(member).kind == MemberKind::EnumCase =>
            {
                self.push(
                    Target::Resolved(Node::member(owner, member)),
                    DependencyKind::UsesEnumCase,
                );
                self.push(Target::Resolved(Node::symbol(owner)), DependencyKind::UsesType);
            }
            Some((owner, member)) => {
                self.push(
                    Target::Resolved(Node::member(owner, member)),
                    DependencyKind::ReadsClassConstant,
                );
            }
            None => {
                let label = self.table.get(class_id).name.clone();
                self.push(
                    Target::Unresolved(format!("{label}::{name}")),
                    DependencyKind::ReadsClassConstant,
                );
            }
        }
    }

    /// `new C(...)`, targeting the class or its constructor per policy.
    fn instantiation(&mut self, class: &str) {
        let target = match self.resolve_type(class) {
            Resolution::Symbol(id) => {
                let constructor = match self.policy {
                    ConstructionPolicy::WholeSymbol => None,
                    ConstructionPolicy::Constructor => {
                        self.table.find_member(id, "__construct", &[MemberKind::Method])
                    }
                };
                match constructor {
                    Some((owner, member)) => Target::Resolved(Node::member(owner, member)),
                    None => Target::Resolved(Node::symbol(id)),
                }
            }
            Resolution::Unresolved(name) => Target::Unresolved(name),
        };
        self.push(target, DependencyKind::Instantiates);
    }

    /// Member access on a receiver, falling back to an unresolved
    /// `Receiver<sep>name` target.
    fn member_access(
        &mut self,
        receiver: Receiver,
        separator: &str,
        name: &str,
        kinds: &[MemberKind],
        kind: DependencyKind,
    ) {
        let target = match receiver {
            Receiver::Class(class) => match self.table.find_member(class, name, kinds) {
                Some((owner, member)) => Target::Resolved(Node::member(owner, member)),
                None => {
                    let label = &self.table.get(class).name;
                    Target::Unresolved(format!("{label}{separator}{name}"))
                }
            },
            Receiver::Unknown(label) => Target::Unresolved(format!("{label}{separator}{name}")),
        };
        self.push(target, kind);
    }

    /// Receiver of a `Class::member` access.
    fn static_receiver(&self, class: &str) -> Receiver {
        match self.resolve_type(class) {
            Resolution::Symbol(id) => Receiver::Class(id),
            Resolution::Unresolved(name) => Receiver::Unknown(name),
        }
    }

    /// Receiver of an `$object->member` access.
    fn receiver(&self, object: &Expr) -> Receiver {
        match self.infer(object) {
            Some(class) => Receiver::Class(class),
            None => Receiver::Unknown(match object {
                Expr::Var { name } => format!("${name}"),
                _ => "<expr>".to_string(),
            }),
        }
    }

    /// Static class type of an expression, when it is known.
    fn infer(&self, expr: &Expr) -> Option<SymbolId> {
        match expr {
            Expr::Var { name } if name == "this" => self.scope.class,
            Expr::Var { name } => self.locals.get(name).copied(),
            Expr::New { class, .. } => self.resolve_type(class).symbol(),
            Expr::Prop { object, name } => {
                let class = self.infer(object)?;
                self.member_class(class, name, MemberKind::Property)
            }
            Expr::MethodCall { object, method, .. } => {
                let class = self.infer(object)?;
                self.member_class(class, method, MemberKind::Method)
            }
            Expr::StaticCall { class, method, .. } => {
                let class = self.resolve_type(class).symbol()?;
                self.member_class(class, method, MemberKind::Method)
            }
            Expr::As { hint, .. } => self.hint_class(hint, &self.scope),
            Expr::Conditional {
                then, otherwise, ..
            } => {
                let then = self.infer(then)?;
                (self.infer(otherwise) == Some(then)).then_some(then)
            }
            _ => None,
        }
    }

    /// Class named by the declared hint of a member (property type or
    /// method return type).
    fn member_class(&self, class: SymbolId, name: &str, kind: MemberKind) -> Option<SymbolId> {
        let (owner, member) = self.table.find_member(class, name, &[kind])?;
        let symbol = self.table.get(owner);
        let hint = symbol.member_at(member).hint.as_ref()?;
        let scope = Scope::new(symbol.namespace.as_deref(), Some(owner));
        // `this` return types follow the receiver, not the owner
        if matches!(hint, Hint::This) {
            return Some(class);
        }
        self.hint_class(hint, &scope)
    }

    /// Class-like symbol a hint names, looking through `?T`.
    fn hint_class(&self, hint: &Hint, scope: &Scope<'_>) -> Option<SymbolId> {
        match hint {
            Hint::Nullable { inner } => self.hint_class(inner, scope),
            Hint::Named { name, .. } if !is_type_keyword(name) && !self.is_generic(name) => {
                let id = self.table.resolve(name, SymbolSpace::Type, scope).symbol()?;
                self.table.get(id).kind.is_classish().then_some(id)
            }
            _ => None,
        }
    }
}
