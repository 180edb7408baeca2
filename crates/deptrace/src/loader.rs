//! Reading declaration records from disk.
//!
//! Inputs are `.json` files holding one [`SourceFile`] each, or directories
//! walked recursively for them. A directory that cannot be read or a file
//! that fails to decode becomes an `InvalidInput` diagnostic; the rest of the
//! batch still loads.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::ast::SourceFile;
use crate::error::{Diagnostic, Error, Result};

/// Extension of declaration record files.
pub const INPUT_EXTENSION: &str = "json";

/// Result of loading a batch of inputs.
#[derive(Debug, Default)]
pub struct Loaded {
    /// Decoded files, ordered by path
    pub sources: Vec<SourceFile>,
    /// Directories that could not be read and files that could not be decoded
    pub diagnostics: Vec<Diagnostic>,
}

/// Decode a single declaration file.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read and `Error::Json` if it is
/// not a valid declaration record.
pub fn load_file(path: &Path) -> Result<SourceFile> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every input, expanding directories.
///
/// Files are decoded in path order so the resulting analysis does not depend
/// on directory iteration order.
///
/// # Errors
///
/// Returns `Error::Io` if a named input does not exist.
pub fn load_inputs(inputs: &[PathBuf]) -> Result<Loaded> {
    let mut loaded = Loaded::default();
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            walk_dir(input, &mut files, &mut loaded.diagnostics);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input not found: {}", input.display()),
            )));
        }
    }
    files.sort();
    files.dedup();

    for path in files {
        match load_file(&path) {
            Ok(source) => {
                debug!(
                    path = %path.display(),
                    declarations = source.declarations.len(),
                    "Loaded declaration file"
                );
                loaded.sources.push(source);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping invalid declaration file");
                loaded.diagnostics.push(Diagnostic::invalid_input(path, &e));
            }
        }
    }
    Ok(loaded)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>, diagnostics: &mut Vec<Diagnostic>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(
                directory = %dir.display(),
                error = %e,
                "Cannot read directory, skipping"
            );
            diagnostics.push(Diagnostic::invalid_input(dir.to_path_buf(), &Error::Io(e)));
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(
                    directory = %dir.display(),
                    error = %e,
                    "Failed to read directory entry, skipping"
                );
                diagnostics.push(Diagnostic::invalid_input(dir.to_path_buf(), &Error::Io(e)));
                continue;
            }
        };

        let path = entry.path();

        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with('.'))
        {
            continue;
        }

        if path.is_dir() {
            walk_dir(&path, files, diagnostics);
        } else if path.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(INPUT_EXTENSION)
        {
            files.push(path);
        }
    }
}
