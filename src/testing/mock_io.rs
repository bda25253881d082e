//! Scratch directories and output readers for tests that touch the disk.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory that is automatically deleted when dropped.
pub struct TempDirPath {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// Create a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a file path within this directory.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }
}

/// Every regular file under `root`, as `/`-separated paths relative to
/// `root`, sorted.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn list_files(root: impl AsRef<Path>) -> Result<Vec<String>> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
        for entry in std::fs::read_dir(dir).with_context(|| format!("read_dir {}", dir.display()))? {
            let path = entry?.path();
            if path.is_dir() {
                walk(root, &path, out)?;
            } else if let Ok(rel) = path.strip_prefix(root) {
                let parts: Vec<String> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                out.push(parts.join("/"));
            }
        }
        Ok(())
    }

    let root = root.as_ref();
    let mut out = Vec::new();
    walk(root, root, &mut out)?;
    out.sort();
    Ok(out)
}

/// Parse a JSON file written by the pipeline (e.g. the quality report).
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON.
pub fn read_json_output<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).with_context(|| format!("open {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
}

/// Read a Parquet file back into typed rows.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or the rows do not match `T`.
pub fn read_parquet_output<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    crate::io::parquet::read_parquet_vec(path)
}
