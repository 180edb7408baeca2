//! Error types for deptrace operations.
//!
//! Errors are split the same way the analysis itself is:
//!
//! - **`Error`**: hard failures that stop an operation (unreadable input,
//!   invalid configuration, a query naming an unknown symbol)
//! - **`Diagnostic`**: soft findings collected during a pass (duplicate
//!   declarations, unresolved references, malformed input files)
//!
//! ## Error Philosophy
//!
//! Analysis is "best effort":
//! - A duplicate declaration is reported and the later one shadows
//! - An unresolved reference becomes an edge flagged `unresolved`
//! - One malformed input file doesn't stop the rest of the batch

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Location, SymbolKind};

/// Result type for deptrace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for deptrace operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A declaration file could not be decoded
    #[error("invalid declaration file {}: {source}", path.display())]
    Json {
        /// File that failed to decode
        path: PathBuf,
        /// Underlying decoder error
        #[source]
        source: serde_json::Error,
    },

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// A query named a symbol that is not in the symbol table
    #[error(transparent)]
    UnknownSymbol(#[from] UnknownSymbolError),
}

/// A closure or dependents query named a symbol absent from the table.
///
/// Kept distinct from an empty result so callers can tell "no dependencies"
/// from "no such symbol".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown symbol: {name}")]
pub struct UnknownSymbolError {
    /// The name as given by the caller
    pub name: String,
}

/// Two declarations claimed the same name in the same symbol space.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "duplicate symbol {name}: {incoming} at {incoming_location} shadows {existing} at {existing_location}"
)]
pub struct DuplicateSymbolError {
    /// Fully-qualified name both declarations use
    pub name: String,
    /// Kind of the declaration already registered
    pub existing: SymbolKind,
    /// Where the registered declaration lives
    pub existing_location: Location,
    /// Kind of the declaration being registered
    pub incoming: SymbolKind,
    /// Where the new declaration lives
    pub incoming_location: Location,
}

/// A soft finding collected during loading or analysis.
///
/// Diagnostics never halt a pass. They are surfaced next to the edge list so
/// a caller can report missing dependencies instead of silently ignoring them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Category of the finding
    pub kind: DiagnosticKind,
    /// Source file the finding belongs to, when known
    pub path: Option<PathBuf>,
    /// Human-readable message
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {} ({})", path.display(), self.message, self.kind),
            None => write!(f, "{} ({})", self.message, self.kind),
        }
    }
}

/// Categorization of diagnostics.
///
/// Uses a 4xx/5xx style pattern:
/// - Input problems come from the analyzed declarations (user can fix)
/// - Internal problems come from reading the batch itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    // === Input Problems (analogous to HTTP 4xx) ===
    /// Two declarations share a name in the same symbol space
    DuplicateSymbol,

    /// A reference names nothing in the symbol table
    UnresolvedReference,

    // === Internal Problems (analogous to HTTP 5xx) ===
    /// A declaration file could not be read or decoded
    InvalidInput,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateSymbol => write!(f, "duplicate symbol"),
            Self::UnresolvedReference => write!(f, "unresolved reference"),
            Self::InvalidInput => write!(f, "invalid input"),
        }
    }
}

impl DiagnosticKind {
    /// Returns `true` if this is an input problem (4xx-style).
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::DuplicateSymbol | Self::UnresolvedReference)
    }

    /// Returns `true` if this is an internal problem (5xx-style).
    #[must_use]
    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::InvalidInput)
    }
}

impl Diagnostic {
    /// Create a new diagnostic.
    #[must_use]
    pub fn new(kind: DiagnosticKind, path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    /// Diagnostic for a shadowed declaration.
    #[must_use]
    pub fn duplicate_symbol(error: &DuplicateSymbolError) -> Self {
        Self::new(
            DiagnosticKind::DuplicateSymbol,
            Some(error.incoming_location.path.clone()),
            error.to_string(),
        )
    }

    /// Diagnostic for a reference that matched no declaration.
    #[must_use]
    pub fn unresolved_reference(path: PathBuf, from: &str, target: &str) -> Self {
        Self::new(
            DiagnosticKind::UnresolvedReference,
            Some(path),
            format!("{from} references unknown {target}"),
        )
    }

    /// Diagnostic for an input file that could not be loaded.
    #[must_use]
    pub fn invalid_input(path: PathBuf, error: &Error) -> Self {
        Self::new(DiagnosticKind::InvalidInput, Some(path), error.to_string())
    }
}
