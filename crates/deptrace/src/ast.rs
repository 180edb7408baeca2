//! Declaration records produced by the external front-end.
//!
//! This is the input boundary of the extractor: one [`SourceFile`] per
//! analyzed file, holding already-parsed declarations. The shapes mirror the
//! surface syntax closely enough for dependency extraction and nothing more;
//! there is no type information beyond what is written in the source.
//!
//! Records are decoded from JSON. Enums are internally tagged
//! (`"decl"`, `"member"`, `"hint"`, `"expr"`, `"stmt"`, `"kind"`), fields that
//! may be absent default to empty.
//!
//! ```json
//! {
//!   "path": "classes.php",
//!   "declarations": [
//!     { "decl": "class", "name": "A", "line": 8,
//!       "extends": [{ "hint": "named", "name": "A0" }],
//!       "implements": [{ "hint": "named", "name": "I1" }] }
//!   ]
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::Visibility;

// ============================================================================
// Files and declarations
// ============================================================================

/// One analyzed source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Originating path as reported by the front-end
    pub path: PathBuf,
    /// Enclosing namespace, without leading or trailing `\`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Top-level declarations in source order
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl SourceFile {
    /// Create an empty file in the global namespace.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            namespace: None,
            declarations: Vec::new(),
        }
    }

    /// Append a declaration, builder style.
    #[must_use]
    pub fn with(mut self, declaration: impl Into<Declaration>) -> Self {
        self.declarations.push(declaration.into());
        self
    }
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decl", rename_all = "snake_case")]
pub enum Declaration {
    /// Class, interface or trait
    Class(ClassDecl),
    /// Top-level function
    Function(FunctionDecl),
    /// Top-level constant
    Constant(ConstantDecl),
    /// `type` / `newtype` alias
    TypeAlias(TypeAliasDecl),
    /// Enum
    Enum(EnumDecl),
}

impl Declaration {
    /// Name as written (not namespace-qualified).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Class(d) => &d.name,
            Self::Function(d) => &d.name,
            Self::Constant(d) => &d.name,
            Self::TypeAlias(d) => &d.name,
            Self::Enum(d) => &d.name,
        }
    }

    /// Declaration line (1-indexed, 0 when the front-end gave none).
    #[must_use]
    pub fn line(&self) -> u32 {
        match self {
            Self::Class(d) => d.line,
            Self::Function(d) => d.line,
            Self::Constant(d) => d.line,
            Self::TypeAlias(d) => d.line,
            Self::Enum(d) => d.line,
        }
    }
}

impl From<ClassDecl> for Declaration {
    fn from(decl: ClassDecl) -> Self {
        Self::Class(decl)
    }
}

impl From<FunctionDecl> for Declaration {
    fn from(decl: FunctionDecl) -> Self {
        Self::Function(decl)
    }
}

impl From<ConstantDecl> for Declaration {
    fn from(decl: ConstantDecl) -> Self {
        Self::Constant(decl)
    }
}

impl From<TypeAliasDecl> for Declaration {
    fn from(decl: TypeAliasDecl) -> Self {
        Self::TypeAlias(decl)
    }
}

impl From<EnumDecl> for Declaration {
    fn from(decl: EnumDecl) -> Self {
        Self::Enum(decl)
    }
}

/// Flavor of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    /// `class`
    #[default]
    Class,
    /// `interface`
    Interface,
    /// `trait`
    Trait,
}

/// A class, interface or trait.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassDecl {
    /// Name as written
    pub name: String,
    /// Class, interface or trait
    pub kind: ClassKind,
    /// Declaration line
    pub line: u32,
    /// `abstract class`
    pub is_abstract: bool,
    /// `final class`
    pub is_final: bool,
    /// Generic parameters
    pub type_params: Vec<TypeParam>,
    /// `extends` clauses (several for interfaces)
    pub extends: Vec<Hint>,
    /// `implements` clauses
    pub implements: Vec<Hint>,
    /// `require extends` clauses
    pub requires_extends: Vec<Hint>,
    /// Trait `use` clauses
    pub uses: Vec<Hint>,
    /// Members in source order
    pub members: Vec<MemberDecl>,
}

/// A top-level function.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDecl {
    /// Name as written
    pub name: String,
    /// Declaration line
    pub line: u32,
    /// Generic parameters
    pub type_params: Vec<TypeParam>,
    /// Parameters in order
    pub params: Vec<Param>,
    /// Return hint, if written
    pub return_type: Option<Hint>,
    /// Body statements
    pub body: Vec<Stmt>,
}

/// A top-level constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantDecl {
    /// Name as written
    pub name: String,
    /// Declaration line
    #[serde(default)]
    pub line: u32,
    /// Declared type, if written
    #[serde(default)]
    pub hint: Option<Hint>,
    /// Initializer
    pub value: Expr,
}

/// A `type` or `newtype` alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasDecl {
    /// Name as written
    pub name: String,
    /// Declaration line
    #[serde(default)]
    pub line: u32,
    /// `newtype` (opaque outside its file)
    #[serde(default)]
    pub is_opaque: bool,
    /// Generic parameters
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    /// `newtype T as C` constraint
    #[serde(default)]
    pub constraint: Option<Hint>,
    /// Aliased type
    pub target: Hint,
}

/// An enum with its cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    /// Name as written
    pub name: String,
    /// Declaration line
    #[serde(default)]
    pub line: u32,
    /// Underlying type (`enum E: int`)
    pub base: Hint,
    /// `enum E: int as T` constraint
    #[serde(default)]
    pub constraint: Option<Hint>,
    /// Cases in source order
    #[serde(default)]
    pub cases: Vec<EnumCaseDecl>,
}

/// One enum case and its value expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumCaseDecl {
    /// Case name
    pub name: String,
    /// Case value
    pub value: Expr,
}

// ============================================================================
// Members
// ============================================================================

/// A class member declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum MemberDecl {
    /// Instance or static method
    Method(MethodDecl),
    /// Instance or static property
    Property(PropertyDecl),
    /// Class constant
    Constant(ClassConstDecl),
    /// Type constant
    TypeConstant(TypeConstDecl),
}

impl MemberDecl {
    /// Member name as written (properties without `$`).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Method(m) => &m.name,
            Self::Property(m) => &m.name,
            Self::Constant(m) => &m.name,
            Self::TypeConstant(m) => &m.name,
        }
    }
}

impl From<MethodDecl> for MemberDecl {
    fn from(decl: MethodDecl) -> Self {
        Self::Method(decl)
    }
}

impl From<PropertyDecl> for MemberDecl {
    fn from(decl: PropertyDecl) -> Self {
        Self::Property(decl)
    }
}

impl From<ClassConstDecl> for MemberDecl {
    fn from(decl: ClassConstDecl) -> Self {
        Self::Constant(decl)
    }
}

impl From<TypeConstDecl> for MemberDecl {
    fn from(decl: TypeConstDecl) -> Self {
        Self::TypeConstant(decl)
    }
}

/// A method. `body` is `None` for abstract and interface methods.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodDecl {
    /// Method name
    pub name: String,
    /// Declared visibility
    pub visibility: Visibility,
    /// `static function`
    pub is_static: bool,
    /// `abstract function`
    pub is_abstract: bool,
    /// `final function`
    pub is_final: bool,
    /// Generic parameters
    pub type_params: Vec<TypeParam>,
    /// Parameters in order
    pub params: Vec<Param>,
    /// Return hint, if written
    pub return_type: Option<Hint>,
    /// Body statements
    pub body: Option<Vec<Stmt>>,
}

/// A property with optional type and default value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDecl {
    /// Name without `$`
    pub name: String,
    /// Declared visibility
    pub visibility: Visibility,
    /// `static` property
    pub is_static: bool,
    /// Declared type
    pub hint: Option<Hint>,
    /// Initializer
    pub default: Option<Expr>,
}

/// A class constant. `value` is `None` for abstract constants.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassConstDecl {
    /// Constant name
    pub name: String,
    /// Declared type
    pub hint: Option<Hint>,
    /// Initializer
    pub value: Option<Expr>,
}

/// A type constant: `const type T as C = V;`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeConstDecl {
    /// Type constant name
    pub name: String,
    /// `abstract const type`
    pub is_abstract: bool,
    /// `as` constraint
    pub constraint: Option<Hint>,
    /// Assigned type
    pub value: Option<Hint>,
}

/// A function or method parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Param {
    /// Name without `$`
    pub name: String,
    /// Declared type
    pub hint: Option<Hint>,
    /// `...$name`
    pub is_variadic: bool,
    /// `inout $name`
    pub is_inout: bool,
    /// Default value
    pub default: Option<Expr>,
}

/// A generic parameter and its `as` constraints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeParam {
    /// Parameter name (`T`)
    pub name: String,
    /// `as` / `super` bounds
    pub constraints: Vec<Hint>,
}

// ============================================================================
// Type hints
// ============================================================================

/// A type as written in source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hint", rename_all = "snake_case")]
pub enum Hint {
    /// A name with optional generic arguments: `int`, `D<T, int>`, `keyset<T>`
    Named {
        /// Type name as written
        name: String,
        /// Generic arguments
        #[serde(default)]
        args: Vec<Hint>,
    },
    /// `?T`
    Nullable {
        /// Wrapped type
        inner: Box<Hint>,
    },
    /// `(T1, T2)`
    Tuple {
        /// Element types
        elements: Vec<Hint>,
    },
    /// `shape('x' => T, C::K => U)`
    Shape {
        /// Fields in order
        fields: Vec<ShapeFieldHint>,
    },
    /// `(function(T1): R)`
    Function {
        /// Parameter types
        #[serde(default)]
        params: Vec<Hint>,
        /// Return type
        ret: Box<Hint>,
    },
    /// Type-constant access: `this::T`, `C::A::B`
    Access {
        /// `this` or the class the chain starts from
        root: Box<Hint>,
        /// Type constant names, outermost first
        path: Vec<String>,
    },
    /// `this`
    This,
}

impl Hint {
    /// A plain name without generic arguments.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A generic application: `name<args...>`.
    #[must_use]
    pub fn generic(name: impl Into<String>, args: Vec<Hint>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    /// `?inner`
    #[must_use]
    pub fn nullable(inner: Hint) -> Self {
        Self::Nullable {
            inner: Box::new(inner),
        }
    }

    /// `this::a::b`
    #[must_use]
    pub fn this_access(path: &[&str]) -> Self {
        Self::Access {
            root: Box::new(Self::This),
            path: path.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// `Class::a::b`
    #[must_use]
    pub fn access(class: impl Into<String>, path: &[&str]) -> Self {
        Self::Access {
            root: Box::new(Self::named(class)),
            path: path.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// `shape(...)` with literal keys.
    #[must_use]
    pub fn shape(fields: Vec<(&str, Hint)>) -> Self {
        Self::Shape {
            fields: fields
                .into_iter()
                .map(|(key, hint)| ShapeFieldHint {
                    key: ShapeKey::literal(key),
                    hint,
                    optional: false,
                })
                .collect(),
        }
    }
}

/// One field of a shape type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeFieldHint {
    /// Field key
    pub key: ShapeKey,
    /// Field type
    pub hint: Hint,
    /// `?'key' => T`
    #[serde(default)]
    pub optional: bool,
}

/// A shape key: a literal, or a class constant used as the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKey {
    /// `'x'` or `0`
    Literal {
        /// Source text of the literal
        value: String,
    },
    /// `C::NAME`
    ClassConst {
        /// Class as written
        class: String,
        /// Constant name
        name: String,
    },
}

impl ShapeKey {
    /// A string or integer literal key.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    /// A `Class::CONST` key.
    #[must_use]
    pub fn class_const(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ClassConst {
            class: class.into(),
            name: name.into(),
        }
    }
}

// ============================================================================
// Expressions and statements
// ============================================================================

/// An expression.
///
/// Class positions (`class` fields) hold the name as written, including the
/// keywords `self`, `static` and `parent`.
// Variant fields mirror the syntax shown on each variant.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    /// Any literal; carries no dependency
    Literal {
        #[serde(default)]
        value: String,
    },
    /// `$name` (`this` for `$this`)
    Var { name: String },
    /// Top-level constant: `PHP_INT_MAX`
    Const { name: String },
    /// `C::NAME`, including `C::class`
    ClassConst { class: String, name: String },
    /// `C::$name`
    StaticProp { class: String, name: String },
    /// `$obj->name`
    Prop { object: Box<Expr>, name: String },
    /// `f<targs>(args)`
    Call {
        name: String,
        #[serde(default)]
        targs: Vec<Hint>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// `$obj->method(args)`
    MethodCall {
        object: Box<Expr>,
        method: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// `C::method(args)`
    StaticCall {
        class: String,
        method: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// `new C<targs>(args)`
    New {
        class: String,
        #[serde(default)]
        targs: Vec<Hint>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// `Vector {..}`, `Map {..}`, `keyset[..]`, `varray[..]`, `array(..)`
    Collection {
        class: String,
        #[serde(default)]
        targs: Vec<Hint>,
        #[serde(default)]
        entries: Vec<CollectionEntry>,
    },
    /// `shape('x' => e, C::K => e)`
    Shape { fields: Vec<ShapeEntry> },
    /// `tuple(e, ...)`
    Tuple { elements: Vec<Expr> },
    /// `lhs op rhs`
    Binary {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `op operand`
    Unary { op: String, operand: Box<Expr> },
    /// `target = value` (compound assignments too)
    Assign { target: Box<Expr>, value: Box<Expr> },
    /// `base[index]`
    Index {
        base: Box<Expr>,
        #[serde(default)]
        index: Option<Box<Expr>>,
    },
    /// `cond ? then : otherwise`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// `e instanceof C`
    InstanceOf { operand: Box<Expr>, class: String },
    /// `e as T`
    As { operand: Box<Expr>, hint: Hint },
    /// `inout $x` argument
    Inout { operand: Box<Expr> },
    /// `(T $x): R ==> { ... }`
    Lambda {
        #[serde(default)]
        params: Vec<Param>,
        #[serde(default)]
        return_type: Option<Hint>,
        #[serde(default)]
        body: Vec<Stmt>,
    },
}

impl Expr {
    /// A literal with its source text.
    #[must_use]
    pub fn lit(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    /// `$name`
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var { name: name.into() }
    }

    /// `C::NAME`
    #[must_use]
    pub fn class_const(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ClassConst {
            class: class.into(),
            name: name.into(),
        }
    }

    /// `f(args)`
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call {
            name: name.into(),
            targs: Vec::new(),
            args,
        }
    }

    /// `$object->method(args)`
    #[must_use]
    pub fn method_call(object: Expr, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::MethodCall {
            object: Box::new(object),
            method: method.into(),
            args,
        }
    }

    /// `C::method(args)`
    #[must_use]
    pub fn static_call(
        class: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Expr>,
    ) -> Self {
        Self::StaticCall {
            class: class.into(),
            method: method.into(),
            args,
        }
    }

    /// `new C(args)`
    #[must_use]
    pub fn new_object(class: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::New {
            class: class.into(),
            targs: Vec::new(),
            args,
        }
    }

    /// `$object->name`
    #[must_use]
    pub fn prop(object: Expr, name: impl Into<String>) -> Self {
        Self::Prop {
            object: Box::new(object),
            name: name.into(),
        }
    }

    /// `target = value`
    #[must_use]
    pub fn assign(target: Expr, value: Expr) -> Self {
        Self::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// `lhs op rhs`
    #[must_use]
    pub fn binary(op: impl Into<String>, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op: op.into(),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

/// One entry of a collection literal; `key` is set for maps and dicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    /// Map or dict key
    #[serde(default)]
    pub key: Option<Expr>,
    /// Element value
    pub value: Expr,
}

/// One field of a shape literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeEntry {
    /// Field key
    pub key: ShapeKey,
    /// Field value
    pub value: Expr,
}

/// A statement inside a function or method body.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    /// `expr;`
    Expr {
        expr: Expr,
    },
    /// `return value;`
    Return {
        #[serde(default)]
        value: Option<Expr>,
    },
    /// `if (cond) { then } else { otherwise }`
    If {
        cond: Expr,
        #[serde(default)]
        then: Vec<Stmt>,
        #[serde(default)]
        otherwise: Vec<Stmt>,
    },
    /// `while (cond) { body }`, also `for` and `do` loops
    While {
        cond: Expr,
        #[serde(default)]
        body: Vec<Stmt>,
    },
    /// `foreach (collection as $key => $value) { body }`
    Foreach {
        collection: Expr,
        #[serde(default)]
        key: Option<String>,
        value: String,
        #[serde(default)]
        body: Vec<Stmt>,
    },
    /// `switch (subject) { cases }`
    Switch {
        subject: Expr,
        #[serde(default)]
        cases: Vec<SwitchCase>,
    },
    /// `throw value;`
    Throw {
        value: Expr,
    },
    /// `try { body } catch ... finally { finally }`
    Try {
        #[serde(default)]
        body: Vec<Stmt>,
        #[serde(default)]
        catches: Vec<CatchClause>,
        #[serde(default)]
        finally: Vec<Stmt>,
    },
}

impl Stmt {
    /// An expression statement.
    #[must_use]
    pub fn expr(expr: Expr) -> Self {
        Self::Expr { expr }
    }

    /// `return value;`
    #[must_use]
    pub fn ret(value: Expr) -> Self {
        Self::Return { value: Some(value) }
    }
}

/// `case label:` or `default:` (no label).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// `None` for `default:`
    #[serde(default)]
    pub label: Option<Expr>,
    /// Statements up to the next label
    #[serde(default)]
    pub body: Vec<Stmt>,
}

/// `catch (C $var) { body }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    /// Caught class as written
    pub class: String,
    /// Variable name without `$`
    pub var: String,
    /// Handler statements
    #[serde(default)]
    pub body: Vec<Stmt>,
}
