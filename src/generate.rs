//! HTML page output.
//!
//! Writes one standalone HTML document per published item:
//!
//! ```text
//! dist/
//! └── blogs/
//!     ├── hello/
//!     │   └── index.html
//!     └── 2024/
//!         └── launch/
//!             └── index.html
//! ```
//!
//! Pages are bare (title, date, rendered body). Layout and
//! navigation belong to whatever consumes the output.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating, so
//! titles and descriptions are escaped automatically. The body is inserted
//! as-is because it is already sanitized HTML from [`crate::render`].

use crate::collection::Collection;
use crate::config::MarkdownConfig;
use crate::render::{self, RenderError};
use crate::types::ContentItem;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("item `{0}` must be rendered before it is written")]
    NotRendered(String),
}

/// One written page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    pub title: String,
    pub slug: String,
    /// Path relative to the output directory.
    pub path: PathBuf,
}

/// Output path of an item's page, relative to the output directory.
pub fn page_path(category: &str, slug: &str) -> PathBuf {
    let mut path = PathBuf::from(category);
    path.extend(slug.split('/'));
    path.join("index.html")
}

/// Build the HTML document for a rendered item.
pub fn render_page(item: &ContentItem) -> Result<Markup, GenerateError> {
    let body = item
        .content
        .html()
        .ok_or_else(|| GenerateError::NotRendered(item.slug.clone()))?;

    Ok(html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (item.title) }
                @if let Some(description) = &item.description {
                    meta name="description" content=(description);
                }
            }
            body {
                article {
                    header {
                        h1 { (item.title) }
                        @if !item.date.is_empty() {
                            time { (item.date) }
                        }
                    }
                    (PreEscaped(body))
                }
            }
        }
    })
}

/// Remove every previously written page of `category` under `output_dir`.
///
/// A missing directory is not an error.
pub fn clear_category(output_dir: &Path, category: &str) -> Result<(), GenerateError> {
    let dir = output_dir.join(category);
    match fs::remove_dir_all(&dir) {
        Ok(()) => {
            debug!(path = %dir.display(), "cleared previous pages");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(GenerateError::Io { path: dir, source }),
    }
}

/// Render every item of `collection` and write its page under `output_dir`.
pub fn write_pages(
    collection: &Collection,
    output_dir: &Path,
    markdown: &MarkdownConfig,
) -> Result<Vec<GeneratedPage>, GenerateError> {
    let rendered = render::render_all(collection.items().to_vec(), markdown)?;

    let mut pages = Vec::with_capacity(rendered.len());
    for item in &rendered {
        let rel = page_path(collection.category(), &item.slug);
        let path = output_dir.join(&rel);
        let markup = render_page(item)?;

        let io_err = |source| GenerateError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&path, markup.into_string()).map_err(io_err)?;
        debug!(path = %rel.display(), "wrote page");

        pages.push(GeneratedPage {
            title: item.title.clone(),
            slug: item.slug.clone(),
            path: rel,
        });
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Body;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn item(slug: &str, body: Body) -> ContentItem {
        ContentItem {
            slug: slug.into(),
            title: "Fish & <Chips>".into(),
            description: Some("A \"quoted\" take".into()),
            date: "2024-01-15".into(),
            draft: None,
            content: body,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn page_path_nests_segments() {
        assert_eq!(
            page_path("blogs", "2024/launch"),
            Path::new("blogs").join("2024").join("launch").join("index.html")
        );
        assert_eq!(page_path("blogs", "hello"), Path::new("blogs/hello/index.html"));
    }

    #[test]
    fn render_page_escapes_metadata_and_embeds_html() {
        let page = render_page(&item("a", Body::Html("<p>hi</p>".into())))
            .unwrap()
            .into_string();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Fish &amp; &lt;Chips&gt;</title>"));
        assert!(page.contains("content=\"A &quot;quoted&quot; take\""));
        assert!(page.contains("<time>2024-01-15</time>"));
        assert!(page.contains("<p>hi</p>"));
    }

    #[test]
    fn render_page_refuses_markdown() {
        let result = render_page(&item("a", Body::Markdown("# raw".into())));
        assert!(matches!(result, Err(GenerateError::NotRendered(_))));
    }

    #[test]
    fn clear_category_removes_only_that_category() {
        let tmp = TempDir::new().unwrap();
        for rel in ["blogs/old/index.html", "notes/keep/index.html"] {
            let path = tmp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }

        clear_category(tmp.path(), "blogs").unwrap();

        assert!(!tmp.path().join("blogs").exists());
        assert!(tmp.path().join("notes/keep/index.html").exists());
        clear_category(tmp.path(), "blogs").unwrap();
    }

    #[test]
    fn write_pages_creates_one_file_per_item() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::from_items(
            "blogs",
            vec![
                item("hello", Body::Markdown("**Hello**".into())),
                item("2024/launch", Body::Markdown("Launch".into())),
            ],
        );

        let pages = write_pages(&collection, tmp.path(), &MarkdownConfig::default()).unwrap();

        assert_eq!(pages.len(), 2);
        let hello = fs::read_to_string(tmp.path().join("blogs/hello/index.html")).unwrap();
        assert!(hello.contains("<strong>Hello</strong>"));
        assert!(!hello.contains("**Hello**"));
        assert!(tmp.path().join("blogs/2024/launch/index.html").exists());
    }
}
