//! Load policy and data files from the filesystem.
//!
//! Directories are walked recursively (hidden directories and `target` are skipped). `.tnt` files are policies;
//! `.json` files are merged into the data store in path order.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::eval::InMemoryStore;
use crate::tester::TestError;

pub const POLICY_EXTENSION: &str = "tnt";
pub const DATA_EXTENSION: &str = "json";

/// Everything loaded for a run.
#[derive(Debug, Default)]
pub struct Loaded {
    /// Policy path to source text
    pub policies: BTreeMap<String, String>,
    pub store: InMemoryStore,
}

/// Load every policy and data file under `paths`.
///
/// ## Errors
/// - [`TestError::Io`] if a path does not exist, a directory cannot be listed or a file cannot be read.
/// - [`TestError::Setup`] if a data file is not valid JSON.
pub fn load(paths: &[PathBuf]) -> Result<Loaded, TestError> {
    let mut files = Vec::new();
    for path in paths {
        fs::metadata(path)?;
        files.extend(discover_files(path)?);
    }
    files.sort();
    files.dedup();

    let mut loaded = Loaded::default();
    for file in files {
        let text = fs::read_to_string(&file)?;
        let key = file.to_string_lossy().to_string();
        match extension(&file) {
            Some(POLICY_EXTENSION) => {
                loaded.policies.insert(key, text);
            }
            Some(DATA_EXTENSION) => {
                let doc: serde_json::Value =
                    serde_json::from_str(&text).map_err(|e| TestError::Setup(format!("{}: {}", key, e)))?;
                loaded.store.merge(doc);
            }
            _ => {}
        }
    }
    tracing::debug!(policies = loaded.policies.len(), "loaded files");
    Ok(loaded)
}

/// Find policy and data files under a path.
///
/// Symlinked directories are not followed. Symlinks to files are loaded.
///
/// ## Errors
/// Returns the I/O error of any directory that cannot be listed.
pub fn discover_files(path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        if is_loadable(path) {
            files.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                let name = entry_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if !name.starts_with('.') && name != "target" {
                    files.extend(discover_files(&entry_path)?);
                }
            } else if file_type.is_symlink() && entry_path.is_dir() {
                tracing::debug!(path = %entry_path.display(), "not following symlinked directory");
            } else if is_loadable(&entry_path) {
                files.push(entry_path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

fn is_loadable(path: &Path) -> bool {
    matches!(extension(path), Some(POLICY_EXTENSION | DATA_EXTENSION))
}
