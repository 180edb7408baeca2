//! Analysis configuration.
//!
//! Loaded from a `deptrace.yaml` file:
//!
//! ```yaml
//! construction: whole_symbol   # or: constructor
//! parallel: true
//! builtins:
//!   classes: [Exception, Vector, Map]
//!   functions: [PHP\ini_set]
//!   constants: [PHP_INT_MAX]
//! ```
//!
//! Every key is optional; a missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Name of the configuration file looked up next to the inputs.
pub const CONFIG_FILE_NAME: &str = "deptrace.yaml";

/// Which node a `new T(...)` expression depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionPolicy {
    /// The class as a whole
    #[default]
    WholeSymbol,
    /// `T::__construct` when declared, else the class as a whole
    Constructor,
}

/// Names registered as builtin stubs before analysis.
///
/// References to these resolve as external instead of unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Builtins {
    /// Builtin classes and interfaces
    pub classes: Vec<String>,
    /// Builtin functions
    pub functions: Vec<String>,
    /// Builtin constants
    pub constants: Vec<String>,
}

impl Builtins {
    /// Whether no stub names are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.functions.is_empty() && self.constants.is_empty()
    }
}

/// Configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target of `new T(...)` edges
    pub construction: ConstructionPolicy,
    /// Collect references on the rayon pool
    pub parallel: bool,
    /// Builtin stubs
    pub builtins: Builtins,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            construction: ConstructionPolicy::default(),
            parallel: true,
            builtins: Builtins::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// it is not valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Parse configuration from YAML text. An empty document yields defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid configuration.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load `deptrace.yaml` from `dir`, or defaults when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            debug!(path = %path.display(), "Loading configuration");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Directory to run [`Config::discover`] in for a set of inputs: the
    /// first input itself when it is a directory, else its parent.
    #[must_use]
    pub fn search_dir(inputs: &[PathBuf]) -> Option<PathBuf> {
        let first = inputs.first()?;
        if first.is_dir() {
            Some(first.clone())
        } else {
            first.parent().map(Path::to_path_buf)
        }
    }
}
