//! Content tree walking.
//!
//! The walker enumerates every regular file under a category root. It does
//! no filtering of its own: extension matching and hidden-file handling happen
//! downstream in [`crate::content`]. Entries are visited in file-name order so
//! that two runs over the same tree always produce the same sequence, which
//! the collection assembler relies on for stable tie-breaking.
//!
//! Any filesystem error (missing root, unreadable directory) aborts the walk.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WalkError {
    fn from_walkdir(root: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        WalkError::Io { path, source }
    }
}

/// Recursively collect the full path of every regular file under `root`.
///
/// Directories are expanded depth-first. Symlinks are not followed.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>, WalkError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| WalkError::from_walkdir(root, e))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// List the direct children of `dir` by name, skipping hidden entries.
///
/// Hidden means the name starts with `.`. Names are returned sorted.
pub fn list_file_names(dir: &Path) -> Result<Vec<String>, WalkError> {
    let io_err = |source| WalkError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Express `path` relative to `root` with `/` separators on every platform.
///
/// Returns `None` when `path` is not under `root`.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(parts.join("/"))
}
