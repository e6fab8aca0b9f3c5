//! Whole-project operations.
//!
//! A [`Project`] pairs a project root with its loaded [`SiteConfig`] and wires
//! the stages together:
//!
//! ```text
//! walk → resolve (per file) → collection (per category) ─┬→ search index (all categories)
//!                                                        └→ render + write pages
//! ```
//!
//! Every category is loaded before anything is written, so a malformed file
//! anywhere aborts the build with no output touched. Each category's output
//! directory is then cleared and rewritten, so pages of deleted or drafted
//! items disappear. The search index is written last, after all pages.

use crate::collection::Collection;
use crate::config::{self, ConfigError, SiteConfig};
use crate::content::{Category, ContentError};
use crate::generate::{self, GenerateError, GeneratedPage};
use crate::render::{self, RenderError};
use crate::router::{SlugRequest, SlugRouter};
use crate::search::{self, SearchError};
use crate::types::{ContentItem, SearchEntry};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("category `{category}`: enumerated slugs do not resolve: {}", slugs.join(", "))]
    RouteMismatch { category: String, slugs: Vec<String> },
}

/// Per-category outcome of a build.
#[derive(Debug, Clone)]
pub struct CategoryReport {
    pub category: String,
    pub pages: Vec<GeneratedPage>,
}

/// Outcome of [`Project::build`].
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub categories: Vec<CategoryReport>,
    pub index_path: PathBuf,
    pub index_entries: usize,
}

/// Outcome of [`Project::check`]: published item count per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub categories: Vec<(String, usize)>,
}

/// A content project on disk.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: SiteConfig,
}

impl Project {
    /// Open the project at `root`, loading `slugpress.toml` if present.
    pub fn open(root: &Path) -> Result<Self, BuildError> {
        let config = config::load_config(root)?;
        Ok(Self::with_config(root, config))
    }

    pub fn with_config(root: &Path, config: SiteConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn categories(&self) -> Vec<Category> {
        Category::all_from_config(&self.config, &self.root)
    }

    pub fn category(&self, name: &str) -> Result<Category, ContentError> {
        Category::from_config(&self.config, &self.root, name)
    }

    pub fn router(&self, name: &str) -> Result<SlugRouter, ContentError> {
        Ok(SlugRouter::new(
            self.category(name)?,
            self.config.routing.nested_policy,
        ))
    }

    /// Published collections of every category, in configured order.
    pub fn collections(&self) -> Result<Vec<Collection>, ContentError> {
        self.categories().iter().map(Collection::load).collect()
    }

    pub fn collection(&self, name: &str) -> Result<Collection, ContentError> {
        Collection::load(&self.category(name)?)
    }

    /// Resolve a published item and render its body.
    pub fn show(
        &self,
        category: &str,
        request: impl Into<SlugRequest>,
    ) -> Result<ContentItem, BuildError> {
        let item = self.router(category)?.resolve_by_slug(request)?;
        Ok(render::render_item(item, &self.config.markdown)?)
    }

    /// Rebuild only the search index.
    pub fn build_index(&self) -> Result<Vec<SearchEntry>, BuildError> {
        let path = self.config.index_path(&self.root);
        Ok(search::rebuild_index(&self.categories(), &path)?)
    }

    /// Load everything, write every page, then write the search index.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let collections = self.collections()?;
        let entries = search::build_index(&collections);

        let output_dir = self.config.output_path(&self.root);
        let mut categories = Vec::with_capacity(collections.len());
        for collection in &collections {
            generate::clear_category(&output_dir, collection.category())?;
            let pages = generate::write_pages(collection, &output_dir, &self.config.markdown)?;
            info!(category = %collection.category(), pages = pages.len(), "wrote pages");
            categories.push(CategoryReport {
                category: collection.category().to_string(),
                pages,
            });
        }

        let index_path = self.config.index_path(&self.root);
        search::write_index(&index_path, &entries)?;

        Ok(BuildReport {
            categories,
            index_path,
            index_entries: entries.len(),
        })
    }

    /// Load every category and confirm each enumerated route resolves back to itself.
    pub fn check(&self) -> Result<CheckReport, BuildError> {
        let mut categories = Vec::new();
        for category in self.categories() {
            let name = category.name().to_string();
            let router = SlugRouter::new(category, self.config.routing.nested_policy);
            let mismatches = router.mismatches()?;
            if !mismatches.is_empty() {
                return Err(BuildError::RouteMismatch {
                    category: name,
                    slugs: mismatches,
                });
            }
            let published = router.resolve_slugs()?.len();
            categories.push((name, published));
        }
        Ok(CheckReport { categories })
    }
}
