//! Project configuration.
//!
//! Handles loading, validating, and merging `slugpress.toml`. The file lives
//! in the project root (the directory that contains the content root) and is
//! optional: stock defaults are used for anything it doesn't set.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_root = "content"        # One subdirectory per category
//! output_dir = "dist"             # Rendered pages are written here
//! categories = ["blogs"]          # Iteration order also orders the search index
//!
//! [search]
//! index_path = "content/search/index.json"
//! description_length = 70         # Preview length for search results
//!
//! [dates]
//! format = "%Y-%m-%d"             # strftime format for normalized dates
//!
//! [markdown]
//! extensions = ["md"]             # Content file extensions, stripped for slugs
//! smart_punctuation = false
//! footnotes = true
//!
//! [routing]
//! nested_policy = "partitioned"   # or "unified"
//!
//! [processing]
//! max_processes = 4               # Max parallel render workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! categories = ["blogs", "notes"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::router::NestedPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the project root.
pub const CONFIG_FILENAME: &str = "slugpress.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `slugpress.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding one subdirectory per category, relative to the project root.
    pub content_root: String,
    /// Directory rendered pages are written to, relative to the project root.
    pub output_dir: String,
    /// Known content categories, in search-index order.
    pub categories: Vec<String>,
    pub search: SearchConfig,
    pub dates: DatesConfig,
    pub markdown: MarkdownConfig,
    pub routing: RoutingConfig,
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_root: "content".to_string(),
            output_dir: "dist".to_string(),
            categories: vec!["blogs".to_string()],
            search: SearchConfig::default(),
            dates: DatesConfig::default(),
            markdown: MarkdownConfig::default(),
            routing: RoutingConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::Validation(
                "categories must not be empty".into(),
            ));
        }
        for (i, name) in self.categories.iter().enumerate() {
            if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
                return Err(ConfigError::Validation(format!(
                    "category `{name}` must be a plain directory name"
                )));
            }
            if self.categories[..i].contains(name) {
                return Err(ConfigError::Validation(format!(
                    "category `{name}` is listed twice"
                )));
            }
        }
        if self.markdown.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "markdown.extensions must not be empty".into(),
            ));
        }
        if let Some(ext) = self
            .markdown
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(ConfigError::Validation(format!(
                "markdown.extensions entry `{ext}` must be a bare extension like \"md\""
            )));
        }
        if self.search.description_length == 0 {
            return Err(ConfigError::Validation(
                "search.description_length must be greater than 0".into(),
            ));
        }
        if !is_valid_date_format(&self.dates.format) {
            return Err(ConfigError::Validation(format!(
                "dates.format `{}` is not a valid strftime format",
                self.dates.format
            )));
        }
        Ok(())
    }

    /// Absolute content root for a project rooted at `root`.
    pub fn content_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.content_root)
    }

    pub fn category_dir(&self, root: &Path, category: &str) -> PathBuf {
        self.content_dir(root).join(category)
    }

    pub fn index_path(&self, root: &Path) -> PathBuf {
        root.join(&self.search.index_path)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }
}

fn is_valid_date_format(format: &str) -> bool {
    use chrono::format::{Item, StrftimeItems};
    !format.is_empty() && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Search index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Where the index is written, relative to the project root.
    pub index_path: String,
    /// Maximum characters of description shown in search previews.
    pub description_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_path: "content/search/index.json".to_string(),
            description_length: 70,
        }
    }
}

/// Date normalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatesConfig {
    /// strftime format applied to front-matter dates that parse as dates.
    /// Collections sort on the formatted string, so keep it most-significant-first.
    pub format: String,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Markdown discovery and rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// File extensions treated as content, without the dot. Tried in order
    /// when resolving a slug back to a file.
    pub extensions: Vec<String>,
    /// Curly quotes and dashes.
    pub smart_punctuation: bool,
    pub footnotes: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string()],
            smart_punctuation: false,
            footnotes: true,
        }
    }
}

/// Static route generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
    pub nested_policy: NestedPolicy,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `slugpress.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config for the project rooted at `root`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `slugpress.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# slugpress configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory holding one subdirectory per content category.
content_root = "content"

# Rendered pages are written to <output_dir>/<category>/<slug>/index.html.
output_dir = "dist"

# Known categories. The order here is also the order of the search index.
categories = ["blogs"]

# ---------------------------------------------------------------------------
# Search index
# ---------------------------------------------------------------------------
[search]
# Rebuilt wholesale on every build.
index_path = "content/search/index.json"

# Characters of description kept in search result previews.
description_length = 70

# ---------------------------------------------------------------------------
# Dates
# ---------------------------------------------------------------------------
[dates]
# strftime format for front-matter dates such as `date: 2024-01-15`.
# Collections are sorted newest-first by comparing the formatted strings,
# so keep the most significant part first.
format = "%Y-%m-%d"

# ---------------------------------------------------------------------------
# Markdown
# ---------------------------------------------------------------------------
[markdown]
# Extensions (without the dot) recognized as content files.
extensions = ["md"]

# Convert straight quotes and dashes to typographic ones.
smart_punctuation = false

# Enable [^1] footnotes.
footnotes = true

# ---------------------------------------------------------------------------
# Routing
# ---------------------------------------------------------------------------
[routing]
# "partitioned": single-segment slugs go to the flat route and multi-segment
#                slugs to the nested route; no slug is generated twice.
# "unified":     every slug goes through the nested route.
nested_policy = "partitioned"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
