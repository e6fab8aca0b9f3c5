//! Search index building and lookup.
//!
//! ## Build side
//!
//! Every published item of every category is projected to a [`SearchEntry`]
//! and the entries are concatenated in category order, then published order
//! within each category. The whole sequence is serialized in memory and
//! written in one go: the JSON lands in a temporary sibling file which is then
//! renamed over the target, so a failed build never leaves a half-written
//! index and a successful one fully replaces the previous version.
//!
//! ## Read side
//!
//! A serving process loads the index once with [`SearchIndex::init`] and reads
//! it through [`SearchIndex::get`] for the rest of its life. The loaded index is
//! immutable; picking up a rebuilt index means restarting the process.

use crate::collection::Collection;
use crate::content::{Category, ContentError};
use crate::types::SearchEntry;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search index {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("search index JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("search index already loaded")]
    AlreadyLoaded,
}

static INDEX: OnceLock<SearchIndex> = OnceLock::new();

/// Project one collection's items, in published order.
pub fn project(collection: &Collection) -> Vec<SearchEntry> {
    collection
        .items()
        .iter()
        .map(|item| SearchEntry::from((item, collection.category())))
        .collect()
}

/// Concatenate the projections of several collections, in the given order.
pub fn build_index(collections: &[Collection]) -> Vec<SearchEntry> {
    collections.iter().flat_map(project).collect()
}

/// Load every category and build the index from their published items.
///
/// Any category failing to load fails the whole index.
pub fn collect_index(categories: &[Category]) -> Result<Vec<SearchEntry>, ContentError> {
    let collections = categories
        .iter()
        .map(Collection::load)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(build_index(&collections))
}

/// Serialize `entries` and atomically replace the file at `path`.
pub fn write_index(path: &Path, entries: &[SearchEntry]) -> Result<(), SearchError> {
    let json = serde_json::to_string_pretty(entries)?;

    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| SearchError::Io { path, source }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let tmp_path = temp_sibling(path);
    fs::write(&tmp_path, json).map_err(io_err(&tmp_path))?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(path)(e));
    }

    info!(path = %path.display(), entries = entries.len(), "wrote search index");
    Ok(())
}

/// Build the index for `categories` and write it to `path`.
pub fn rebuild_index(
    categories: &[Category],
    path: &Path,
) -> Result<Vec<SearchEntry>, SearchError> {
    let entries = collect_index(categories)?;
    write_index(path, &entries)?;
    Ok(entries)
}

pub fn read_index(path: &Path) -> Result<Vec<SearchEntry>, SearchError> {
    let content = fs::read_to_string(path).map_err(|source| SearchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "index.json".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Shorten `text` to at most `max_len` characters, appending `" ..."` when cut.
///
/// Returns `None` for empty text.
pub fn shortify(text: &str, max_len: usize) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    match text.char_indices().nth(max_len) {
        None => Some(text.to_string()),
        Some((cut, _)) => Some(format!("{} ...", &text[..cut])),
    }
}

/// Read-only search index for a serving process.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    pub fn from_entries(entries: Vec<SearchEntry>) -> Self {
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, SearchError> {
        Ok(Self::from_entries(read_index(path)?))
    }

    /// Load the process-wide index. Fails if it was already loaded.
    pub fn init(path: &Path) -> Result<&'static SearchIndex, SearchError> {
        if INDEX.get().is_some() {
            return Err(SearchError::AlreadyLoaded);
        }
        let index = Self::load(path)?;
        INDEX.set(index).map_err(|_| SearchError::AlreadyLoaded)?;
        INDEX.get().ok_or(SearchError::AlreadyLoaded)
    }

    /// The process-wide index, if [`SearchIndex::init`] has run.
    pub fn get() -> Option<&'static SearchIndex> {
        INDEX.get()
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a SearchEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Entries whose title or description contains `query`, ignoring case.
    ///
    /// A blank query matches everything.
    pub fn matching(&self, query: &str) -> Vec<&SearchEntry> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                needle.is_empty()
                    || e.title.to_lowercase().contains(&needle)
                    || e
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect()
    }
}
