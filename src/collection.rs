//! Published collections.
//!
//! A [`Collection`] is the published view of one category: every resolvable
//! file, minus drafts, newest first. It is the only source for "which slugs
//! exist" and "what are the latest N items".
//!
//! Ordering compares the normalized `date` strings in descending order. The
//! sort is stable, so items with equal dates keep the order the resolver
//! produced them in (file-name order from the walker). Items without a date
//! have an empty string and therefore sort last.
//!
//! A single malformed file fails the whole collection; there is no
//! skip-and-continue. So do two files that strip to the same slug.

use crate::content::{Category, ContentError};
use crate::types::ContentItem;
use tracing::{debug, info};

/// Filter out drafts and sort newest-first, keeping resolution order on ties.
pub fn assemble(items: Vec<ContentItem>) -> Vec<ContentItem> {
    let mut published: Vec<ContentItem> = items
        .into_iter()
        .filter(|item| {
            let keep = item.is_published();
            if !keep {
                debug!(slug = %item.slug, "skipping draft");
            }
            keep
        })
        .collect();
    published.sort_by(|a, b| b.date.cmp(&a.date));
    published
}

/// The published, sorted items of one category.
#[derive(Debug, Clone)]
pub struct Collection {
    category: String,
    items: Vec<ContentItem>,
}

impl Collection {
    /// Resolve every content file in `category` and assemble the result.
    pub fn load(category: &Category) -> Result<Self, ContentError> {
        let names = category.file_names()?;
        category.ensure_unique_slugs(&names)?;
        let items = names
            .iter()
            .map(|name| category.resolve(name))
            .collect::<Result<Vec<_>, _>>()?;
        let total = items.len();
        let collection = Self::from_items(category.name(), items);
        info!(
            category = %category.name(),
            published = collection.len(),
            drafts = total - collection.len(),
            "assembled collection"
        );
        Ok(collection)
    }

    /// Assemble already-resolved items (in resolution order).
    pub fn from_items(category: &str, items: Vec<ContentItem>) -> Self {
        Self {
            category: category.to_string(),
            items: assemble(items),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ContentItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Slugs in published order.
    pub fn slugs(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.slug.as_str()).collect()
    }

    /// The newest `n` items (fewer if the collection is smaller).
    pub fn latest(&self, n: usize) -> &[ContentItem] {
        &self.items[..n.min(self.items.len())]
    }

    pub fn get(&self, slug: &str) -> Option<&ContentItem> {
        self.items.iter().find(|i| i.slug == slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{self, find_item, load_collection, setup_fixtures, write_file};
    use crate::types::Body;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn item(slug: &str, date: &str, draft: Option<bool>) -> ContentItem {
        ContentItem {
            slug: slug.into(),
            title: slug.to_uppercase(),
            description: None,
            date: date.into(),
            draft,
            content: Body::Markdown(String::new()),
            extra: BTreeMap::new(),
        }
    }

    fn slugs(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|i| i.slug.as_str()).collect()
    }

    #[test]
    fn drafts_are_removed() {
        let items = vec![
            item("a", "2024-01-01", None),
            item("b", "2024-01-02", Some(true)),
            item("c", "2024-01-03", Some(false)),
        ];
        let published = assemble(items);
        assert_eq!(slugs(&published), vec!["c", "a"]);
        assert!(published.iter().all(|i| i.draft != Some(true)));
    }

    #[test]
    fn sorted_newest_first() {
        let items = vec![
            item("old", "2023-05-01", None),
            item("new", "2024-03-01", None),
            item("mid", "2023-12-31", None),
        ];
        assert_eq!(slugs(&assemble(items)), vec!["new", "mid", "old"]);
    }

    #[test]
    fn equal_dates_keep_resolution_order() {
        let items = vec![
            item("first", "2024-01-01", None),
            item("newer", "2024-02-01", None),
            item("second", "2024-01-01", None),
            item("third", "2024-01-01", None),
        ];
        assert_eq!(
            slugs(&assemble(items)),
            vec!["newer", "first", "second", "third"]
        );
    }

    #[test]
    fn undated_items_sort_last() {
        let items = vec![item("undated", "", None), item("dated", "2020-01-01", None)];
        assert_eq!(slugs(&assemble(items)), vec!["dated", "undated"]);
    }

    #[test]
    fn latest_is_bounded() {
        let c = Collection::from_items(
            "blogs",
            vec![item("a", "2024-01-03", None), item("b", "2024-01-02", None)],
        );
        assert_eq!(slugs(c.latest(1)), vec!["a"]);
        assert_eq!(c.latest(10).len(), 2);
        assert!(c.latest(0).is_empty());
    }

    #[test]
    fn get_finds_published_only() {
        let c = Collection::from_items(
            "blogs",
            vec![item("a", "2024-01-03", None), item("d", "2024-01-04", Some(true))],
        );
        assert!(c.get("a").is_some());
        assert!(c.get("d").is_none());
    }

    #[test]
    fn load_published_draft_scenario() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("a.md"),
            "---\ntitle: A\ndate: 2024-02-01\n---\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("b.md"),
            "---\ntitle: B\ndate: 2024-01-01\ndraft: true\n---\n",
        )
        .unwrap();

        let category = Category::new("blogs", tmp.path(), vec!["md".into()], "%Y-%m-%d");
        let c = Collection::load(&category).unwrap();

        assert_eq!(c.len(), 1);
        assert_eq!(c.items()[0].slug, "a");
        assert_eq!(c.category(), "blogs");
    }

    #[test]
    fn load_rejects_two_files_with_one_slug() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("post.md"), "---\ntitle: MD\n---\n").unwrap();
        fs::write(tmp.path().join("post.mdx"), "---\ntitle: MDX\n---\n").unwrap();

        let category = Category::new(
            "blogs",
            tmp.path(),
            vec!["md".into(), "mdx".into()],
            "%Y-%m-%d",
        );
        assert!(matches!(
            Collection::load(&category),
            Err(ContentError::DuplicateSlug { .. })
        ));
    }

    #[test]
    fn load_fails_on_one_malformed_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("good.md"), "---\ntitle: ok\n---\n").unwrap();
        fs::write(tmp.path().join("bad.md"), "---\ntitle: ok\n").unwrap();

        let category = Category::new("blogs", tmp.path(), vec!["md".into()], "%Y-%m-%d");
        assert!(matches!(
            Collection::load(&category),
            Err(ContentError::Parse { .. })
        ));
    }

    #[test]
    fn fixture_blog_is_published_newest_first() {
        let tmp = setup_fixtures();
        let c = load_collection(tmp.path(), "blogs");

        assert_eq!(
            test_helpers::slugs(&c),
            vec!["2024/launch", "rust-tips", "hello"]
        );
        let hello = find_item(&c, "hello");
        assert_eq!(hello.title, "Hello World");
        assert_eq!(hello.extra["tags"], serde_json::json!(["intro", "meta"]));
        assert!(c.get("unfinished").is_none());
    }

    #[test]
    fn fixture_new_post_joins_collection() {
        let tmp = setup_fixtures();
        write_file(
            tmp.path(),
            "content/notes/second.md",
            "---\ntitle: Second\ndate: 2023-12-01\n---\n",
        );
        let c = load_collection(tmp.path(), "notes");
        assert_eq!(test_helpers::slugs(&c), vec!["second", "first-note"]);
    }
}
