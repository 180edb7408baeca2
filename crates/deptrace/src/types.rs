//! Domain types for deptrace dependency extraction.
//!
//! These types represent the core domain model:
//! - **Declarations**: `Symbol`, `Member` (owned by the symbol table arena)
//! - **Graph**: `Node`, `Target`, `Edge`, `DependencyKind`, `Site`
//! - **Results**: `Cycle` (query results)
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Symbol identity | Arena index newtype | Parent lists and edges stay `Copy` |
//! | Enum cases | `MemberKind::EnumCase` | A case always belongs to its enum |
//! | Unresolved targets | Kept as names | Missing dependencies get reported |
//! | Edge site | Signature or body | Fine closures skip body-only edges |

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ast::Hint;

// ============================================================================
// Strongly-typed ID wrappers
// ============================================================================

/// A strongly-typed index into the symbol table arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub(crate) usize);

impl SymbolId {
    /// Position of the symbol in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A strongly-typed index into a symbol's member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(pub(crate) usize);

impl MemberId {
    /// Position of the member in its owner's member list.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Kinds of top-level declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Concrete class
    Class,
    /// Class declared `abstract`
    AbstractClass,
    /// Interface
    Interface,
    /// Trait (members copied into the using class)
    Trait,
    /// Top-level function
    Function,
    /// Top-level constant
    Constant,
    /// `type` or `newtype` alias
    TypeAlias,
    /// Enum (its cases are members)
    Enum,
}

impl SymbolKind {
    /// Stable lowercase name used in reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::AbstractClass => "abstract_class",
            Self::Interface => "interface",
            Self::Trait => "trait",
            Self::Function => "function",
            Self::Constant => "constant",
            Self::TypeAlias => "type_alias",
            Self::Enum => "enum",
        }
    }

    /// The symbol space this kind of declaration binds its name in.
    #[must_use]
    pub fn space(&self) -> SymbolSpace {
        match self {
            Self::Function => SymbolSpace::Function,
            Self::Constant => SymbolSpace::Constant,
            Self::Class
            | Self::AbstractClass
            | Self::Interface
            | Self::Trait
            | Self::TypeAlias
            | Self::Enum => SymbolSpace::Type,
        }
    }

    /// Whether symbols of this kind can own members and have supertypes.
    #[must_use]
    pub fn is_classish(&self) -> bool {
        matches!(
            self,
            Self::Class | Self::AbstractClass | Self::Interface | Self::Trait | Self::Enum
        )
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Independent name spaces: a function and a class may share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolSpace {
    /// Classes, interfaces, traits, enums, type aliases
    Type,
    /// Top-level functions
    Function,
    /// Top-level constants
    Constant,
}

/// Kinds of class and enum members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// Instance or static method
    Method,
    /// Instance or static property
    Property,
    /// Value constant (`const int X = 1;`)
    ClassConstant,
    /// Type constant, abstract or concrete (`const type T = int;`)
    TypeConstant,
    /// Enum case
    EnumCase,
}

impl MemberKind {
    /// Stable lowercase name used in reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Property => "property",
            Self::ClassConstant => "class_constant",
            Self::TypeConstant => "type_constant",
            Self::EnumCase => "enum_case",
        }
    }
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible everywhere
    #[default]
    Public,
    /// Visible to the class and its descendants
    Protected,
    /// Visible to the declaring class only
    Private,
}

/// How a dependency is used at the reference site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// Class or interface inheritance (`extends`, trait `use`)
    Extends,
    /// Interface implementation
    Implements,
    /// Interface or trait `require extends`
    RequiresExtends,
    /// `new T(...)`
    Instantiates,
    /// Instance or static method call
    CallsMethod,
    /// Top-level function call
    CallsFunction,
    /// Instance property access
    ReadsProperty,
    /// Static property access
    ReadsStaticProperty,
    /// Class constant access
    ReadsClassConstant,
    /// Top-level constant access
    ReadsGlobalConstant,
    /// Type mention (parameters, returns, fields, generic arguments, `::class`)
    UsesType,
    /// Type constant access (`this::T`, `C::T`)
    UsesTypeConstant,
    /// Enum case access
    UsesEnumCase,
}

impl DependencyKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Extends,
        Self::Implements,
        Self::RequiresExtends,
        Self::Instantiates,
        Self::CallsMethod,
        Self::CallsFunction,
        Self::ReadsProperty,
        Self::ReadsStaticProperty,
        Self::ReadsClassConstant,
        Self::ReadsGlobalConstant,
        Self::UsesType,
        Self::UsesTypeConstant,
        Self::UsesEnumCase,
    ];

    /// Stable snake_case name used in reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extends => "extends",
            Self::Implements => "implements",
            Self::RequiresExtends => "requires_extends",
            Self::Instantiates => "instantiates",
            Self::CallsMethod => "calls_method",
            Self::CallsFunction => "calls_function",
            Self::ReadsProperty => "reads_property",
            Self::ReadsStaticProperty => "reads_static_property",
            Self::ReadsClassConstant => "reads_class_constant",
            Self::ReadsGlobalConstant => "reads_global_constant",
            Self::UsesType => "uses_type",
            Self::UsesTypeConstant => "uses_type_constant",
            Self::UsesEnumCase => "uses_enum_case",
        }
    }

    /// Parse the snake_case name produced by [`DependencyKind::as_str`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Inheritance edges always target a whole symbol.
    #[must_use]
    pub fn is_inheritance(&self) -> bool {
        matches!(
            self,
            Self::Extends | Self::Implements | Self::RequiresExtends
        )
    }
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in a declaration a reference was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    /// Declaration-level: supertypes, hints, initializers and defaults
    Signature,
    /// Function or method body statements
    Body,
}

impl Site {
    /// Stable lowercase name used in reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::Body => "body",
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// A declaring-file position.
///
/// Lines are 1-indexed; builtin stubs use line 0 and the path `<builtin>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Path of the declaring file as given by the front-end
    pub path: PathBuf,
    /// Line of the declaration (1-indexed)
    pub line: u32,
}

impl Location {
    /// Create a location.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }

    /// Location used for configured builtin stubs.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new("<builtin>", 0)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

/// A named top-level declaration.
///
/// Supertype names are kept as written; `SymbolTable::finalize` resolves them
/// into arena indices once every declaration is registered.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Fully-qualified name (namespace prefix included, no leading `\`)
    pub name: String,
    /// What kind of declaration this is
    pub kind: SymbolKind,
    /// Where it was declared
    pub location: Location,
    /// Namespace the declaration lives in, used to resolve its references
    pub namespace: Option<String>,
    /// Generic parameter names
    pub type_params: Vec<String>,
    /// `extends` clauses as written
    pub extends: Vec<String>,
    /// `implements` clauses as written
    pub implements: Vec<String>,
    /// `require extends` clauses as written
    pub requires_extends: Vec<String>,
    /// Trait `use` clauses as written
    pub uses: Vec<String>,
    /// Members in declaration order
    pub members: Vec<Member>,
    /// Aliased type, for type aliases
    pub alias_of: Option<Hint>,
    /// Declared `abstract` (interfaces count as abstract)
    pub is_abstract: bool,
    /// Declared `final`
    pub is_final: bool,
    /// Registered from configured stubs rather than analyzed input
    pub is_builtin: bool,
}

impl Symbol {
    /// Create a symbol with no supertypes or members.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SymbolKind, location: Location) -> Self {
        Self {
            name: name.into(),
            kind,
            location,
            namespace: None,
            type_params: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            requires_extends: Vec::new(),
            uses: Vec::new(),
            members: Vec::new(),
            alias_of: None,
            is_abstract: matches!(kind, SymbolKind::AbstractClass | SymbolKind::Interface),
            is_final: false,
            is_builtin: false,
        }
    }

    /// Create a builtin stub symbol.
    #[must_use]
    pub fn builtin(name: impl Into<String>, kind: SymbolKind) -> Self {
        let mut symbol = Self::new(name, kind, Location::builtin());
        symbol.is_builtin = true;
        symbol
    }

    /// Find a member declared directly on this symbol.
    #[must_use]
    pub fn member(&self, name: &str, kinds: &[MemberKind]) -> Option<MemberId> {
        self.members
            .iter()
            .position(|m| m.name == name && kinds.contains(&m.kind))
            .map(MemberId)
    }

    /// Access a member by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this symbol.
    #[must_use]
    pub fn member_at(&self, id: MemberId) -> &Member {
        &self.members[id.0]
    }

    /// Iterate member ids in declaration order.
    pub fn member_ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        (0..self.members.len()).map(MemberId)
    }
}

/// A member owned by a class-like symbol.
#[derive(Debug, Clone)]
pub struct Member {
    /// Member name (properties without the `$` sigil)
    pub name: String,
    /// What kind of member this is
    pub kind: MemberKind,
    /// Declared `static` (class constants, type constants and cases count as static)
    pub is_static: bool,
    /// Declared `abstract`
    pub is_abstract: bool,
    /// Declared visibility
    pub visibility: Visibility,
    /// Declared type; for type constants the assigned type, else the constraint
    pub hint: Option<Hint>,
    /// The ancestor member this method overrides, linked by `finalize`
    pub overrides: Option<(SymbolId, MemberId)>,
}

impl Member {
    /// Create a public, non-static member.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_static: matches!(
                kind,
                MemberKind::ClassConstant | MemberKind::TypeConstant | MemberKind::EnumCase
            ),
            is_abstract: false,
            visibility: Visibility::Public,
            hint: None,
            overrides: None,
        }
    }
}

// ============================================================================
// Graph
// ============================================================================

/// A dependent or dependency: a whole symbol, or one member of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Node {
    /// Owning symbol
    pub symbol: SymbolId,
    /// Member of `symbol`, `None` for the symbol as a whole
    pub member: Option<MemberId>,
}

impl Node {
    /// The whole symbol.
    #[must_use]
    pub fn symbol(symbol: SymbolId) -> Self {
        Self {
            symbol,
            member: None,
        }
    }

    /// One member of a symbol.
    #[must_use]
    pub fn member(symbol: SymbolId, member: MemberId) -> Self {
        Self {
            symbol,
            member: Some(member),
        }
    }
}

/// The dependency side of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Matched a declaration in the table
    Resolved(Node),
    /// Matched nothing; the name is kept for reporting
    Unresolved(String),
}

impl Target {
    /// The resolved node, if any.
    #[must_use]
    pub fn node(&self) -> Option<Node> {
        match self {
            Self::Resolved(node) => Some(*node),
            Self::Unresolved(_) => None,
        }
    }

    /// Whether the reference failed to resolve.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved(_))
    }
}

/// A directed dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// The dependent
    pub from: Node,
    /// The dependency
    pub to: Target,
    /// How the dependency is used
    pub kind: DependencyKind,
    /// Declaration-level or body-level reference
    pub site: Site,
}

/// A set of symbols that depend on each other transitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    /// Symbol names in the cycle, sorted
    pub symbols: Vec<String>,
}

/// Renders as an unordered set, `{a, b, c}`.
impl std::fmt::Display for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.symbols.join(", "))
    }
}
