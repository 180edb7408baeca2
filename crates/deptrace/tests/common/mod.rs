//! Shared fixtures for integration tests.
//!
//! The three fixture files under `tests/fixtures/` are declaration records
//! for a small Hack project:
//!
//! - `toplevel`: the `A0 <- A <- C`, `B <- D <- E` hierarchy, generics,
//!   aliases, defaults and recursion
//! - `classes`: `AbstractBase <- ImplementingBase <- Derived`, properties,
//!   constructors and `require extends`
//! - `constants`: enums, class and type constants, global constants

// Not every test binary uses every helper
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use deptrace::ast::SourceFile;
use deptrace::{Analysis, Builtins, Config, DependencyKind, loader};

/// Directory holding the fixture declaration files.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Load one fixture by stem (`"classes"`, `"constants"`, `"toplevel"`).
pub fn fixture(name: &str) -> SourceFile {
    let path = fixtures_dir().join(format!("{name}.json"));
    loader::load_file(&path).unwrap_or_else(|e| panic!("load {}: {e}", path.display()))
}

/// All three fixtures, in a fixed order.
pub fn all_fixtures() -> Vec<SourceFile> {
    ["toplevel", "classes", "constants"]
        .into_iter()
        .map(fixture)
        .collect()
}

/// Sequential configuration with the builtins the fixtures mention.
pub fn builtins_config() -> Config {
    Config {
        parallel: false,
        builtins: Builtins {
            classes: vec!["Exception".into(), "Map".into(), "Vector".into()],
            functions: vec!["PHP\\ini_set".into()],
            constants: vec!["PHP_INT_MAX".into()],
        },
        ..Config::default()
    }
}

/// Analysis of every fixture without builtins.
pub fn analyze_all() -> Analysis {
    Analysis::build(&all_fixtures(), &Config::default())
}

/// Analysis of every fixture with builtins registered.
pub fn analyze_all_with_builtins() -> Analysis {
    Analysis::build(&all_fixtures(), &builtins_config())
}

/// `(to, kind)` for every edge whose dependent is exactly `from`.
pub fn edges_from(analysis: &Analysis, from: &str) -> Vec<(String, DependencyKind)> {
    analysis
        .edge_records()
        .into_iter()
        .filter(|r| r.from == from)
        .map(|r| (r.to, r.kind))
        .collect()
}

/// Shorthand for building expected `(to, kind)` lists.
pub fn expect(edges: &[(&str, DependencyKind)]) -> Vec<(String, DependencyKind)> {
    edges
        .iter()
        .map(|(to, kind)| ((*to).to_string(), *kind))
        .collect()
}
