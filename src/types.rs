//! Shared record types.
//!
//! [`ContentItem`] is what the resolver produces and what consumers display.
//! [`SearchEntry`] is its lightweight projection, serialized into the search
//! index and read back by [`crate::search::SearchIndex`].

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// The body of a content item.
///
/// Items start out holding raw markdown and are switched to HTML exactly once
/// by [`crate::render::render_item`]. Keeping the two apart in the type means a
/// display consumer can demand `Html` and never see raw markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Markdown(String),
    Html(String),
}

impl Body {
    pub fn as_str(&self) -> &str {
        match self {
            Body::Markdown(s) | Body::Html(s) => s,
        }
    }

    pub fn is_html(&self) -> bool {
        matches!(self, Body::Html(_))
    }

    /// The rendered HTML, if this body has been rendered.
    pub fn html(&self) -> Option<&str> {
        match self {
            Body::Html(s) => Some(s),
            Body::Markdown(_) => None,
        }
    }
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One parsed content file (for example a blog post).
///
/// The typed fields are the ones the pipeline depends on. Every other
/// front-matter key lands in `extra` untouched and is flattened back into the
/// top level when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    /// Path relative to the category root, `/`-separated, extension stripped.
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Normalized date string; empty when the file has no `date`.
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    pub content: Body,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ContentItem {
    /// Absent or `false` draft flags both count as published.
    pub fn is_published(&self) -> bool {
        self.draft != Some(true)
    }

    /// The slug split into its path segments.
    pub fn segments(&self) -> Vec<&str> {
        self.slug.split('/').collect()
    }
}

/// Cross-category search summary of one published item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of the category the item was sourced from.
    pub category: String,
}

impl From<(&ContentItem, &str)> for SearchEntry {
    fn from((item, category): (&ContentItem, &str)) -> Self {
        SearchEntry {
            slug: item.slug.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            category: category.to_string(),
        }
    }
}
