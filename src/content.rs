//! Content item resolution.
//!
//! A [`Category`] is one subdirectory of the content root (`content/blogs/`).
//! Every file inside it whose extension is recognized is a content item,
//! however deeply nested. The item's slug is its path relative to the category
//! root, `/`-separated, with the extension stripped:
//!
//! ```text
//! content/blogs/
//! ├── hello.md            → "hello"
//! └── 2024/
//!     └── launch.md       → "2024/launch"
//! ```
//!
//! Resolution works in both directions: [`Category::resolve`] turns a file
//! name into a [`ContentItem`], and [`Category::resolve_by_slug`] /
//! [`Category::resolve_by_segments`] turn a slug back into the same item.
//! Items are built fresh on every call; nothing is cached.

use crate::config::SiteConfig;
use crate::front_matter::{self, FrontMatterError};
use crate::types::{Body, ContentItem};
use crate::walk::{self, WalkError};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed front matter in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
    #[error("no item `{slug}` in category `{category}`")]
    NotFound { category: String, slug: String },
    #[error("invalid slug `{0}`")]
    InvalidSlug(String),
    #[error("slug `{slug}` in category `{category}` comes from more than one file: {}", files.join(", "))]
    DuplicateSlug {
        category: String,
        slug: String,
        files: Vec<String>,
    },
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
}

/// One content category rooted at a directory.
#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    root: PathBuf,
    extensions: Vec<String>,
    date_format: String,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        extensions: Vec<String>,
        date_format: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            extensions,
            date_format: date_format.into(),
        }
    }

    /// Look up a configured category under the project at `project_root`.
    pub fn from_config(
        config: &SiteConfig,
        project_root: &Path,
        name: &str,
    ) -> Result<Self, ContentError> {
        if !config.has_category(name) {
            return Err(ContentError::UnknownCategory(name.to_string()));
        }
        Ok(Self::new(
            name,
            config.category_dir(project_root, name),
            config.markdown.extensions.clone(),
            config.dates.format.clone(),
        ))
    }

    /// Every configured category, in configured order.
    pub fn all_from_config(config: &SiteConfig, project_root: &Path) -> Vec<Self> {
        config
            .categories
            .iter()
            .map(|name| {
                Self::new(
                    name.as_str(),
                    config.category_dir(project_root, name),
                    config.markdown.extensions.clone(),
                    config.dates.format.clone(),
                )
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative, `/`-separated names of every content file in the category.
    ///
    /// Files whose extension isn't recognized are skipped. A content file
    /// whose slug could not be looked up again (`..md`, a name containing `\`)
    /// is an `InvalidSlug` error.
    pub fn file_names(&self) -> Result<Vec<String>, ContentError> {
        let files = walk::walk_files(&self.root)?;
        let mut names = Vec::new();
        for name in files
            .iter()
            .filter_map(|f| walk::relative_slash_path(&self.root, f))
        {
            if let Some(slug) = self.strip_extension(&name) {
                validate_slug(slug)?;
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Slugs of every content file, drafts included, in walker order.
    pub fn slugs(&self) -> Result<Vec<String>, ContentError> {
        Ok(self
            .file_names()?
            .iter()
            .filter_map(|name| self.strip_extension(name))
            .map(str::to_string)
            .collect())
    }

    /// Fail if two of `file_names` strip to the same slug (`post.md` and `post.mdx`).
    pub fn ensure_unique_slugs<S: AsRef<str>>(
        &self,
        file_names: &[S],
    ) -> Result<(), ContentError> {
        let mut by_slug: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for name in file_names.iter().map(AsRef::as_ref) {
            if let Some(slug) = self.strip_extension(name) {
                by_slug.entry(slug).or_default().push(name.to_string());
            }
        }
        match by_slug.into_iter().find(|(_, files)| files.len() > 1) {
            Some((slug, files)) => Err(ContentError::DuplicateSlug {
                category: self.name.clone(),
                slug: slug.to_string(),
                files,
            }),
            None => Ok(()),
        }
    }

    /// The slug for a file name, or `None` if its extension isn't recognized.
    pub fn strip_extension<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        self.extensions.iter().find_map(|ext| {
            file_name
                .strip_suffix(ext.as_str())
                .and_then(|rest| rest.strip_suffix('.'))
                .filter(|stem| !stem.is_empty() && !stem.ends_with('/'))
        })
    }

    /// Read and parse one file, attaching its slug.
    pub fn resolve(&self, file_name: &str) -> Result<ContentItem, ContentError> {
        let file_name = file_name.replace('\\', "/");
        let slug = self
            .strip_extension(&file_name)
            .ok_or_else(|| ContentError::InvalidSlug(file_name.clone()))?
            .to_string();
        let path = self.root.join(&file_name);
        let raw = fs::read_to_string(&path).map_err(|source| ContentError::Io {
            path: path.clone(),
            source,
        })?;
        self.build_item(slug, &raw, path)
    }

    /// Resolve a single slug string, which may itself contain `/`.
    pub fn resolve_by_slug(&self, slug: &str) -> Result<ContentItem, ContentError> {
        validate_slug(slug)?;
        for ext in &self.extensions {
            let path = self.root.join(format!("{slug}.{ext}"));
            match fs::read_to_string(&path) {
                Ok(raw) => return self.build_item(slug.to_string(), &raw, path),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(source) => return Err(ContentError::Io { path, source }),
            }
        }
        Err(ContentError::NotFound {
            category: self.name.clone(),
            slug: slug.to_string(),
        })
    }

    /// Resolve an ordered list of slug segments (`["2024", "launch"]`).
    pub fn resolve_by_segments<S: AsRef<str>>(
        &self,
        segments: &[S],
    ) -> Result<ContentItem, ContentError> {
        let slug = segments
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("/");
        self.resolve_by_slug(&slug)
    }

    fn build_item(&self, slug: String, raw: &str, path: PathBuf) -> Result<ContentItem, ContentError> {
        let doc = front_matter::parse(raw, &self.date_format)
            .map_err(|source| ContentError::Parse { path, source })?;
        debug!(category = %self.name, %slug, "resolved content item");
        let meta = doc.front_matter;
        Ok(ContentItem {
            slug,
            title: meta.title,
            description: meta.description,
            date: meta.date,
            draft: meta.draft,
            content: Body::Markdown(doc.body),
            extra: meta.extra,
        })
    }
}

/// Reject slugs that could escape the category root or that no file could produce.
fn validate_slug(slug: &str) -> Result<(), ContentError> {
    let bad = slug.is_empty()
        || slug.contains('\\')
        || slug
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        Err(ContentError::InvalidSlug(slug.to_string()))
    } else {
        Ok(())
    }
}
