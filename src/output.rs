//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every item leads with
//! its positional index and title; slugs, dates and output paths follow as
//! indented context lines. The listing reads as a content inventory while
//! still letting users trace each entry back to a file.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! blogs (3 published)
//! 001 Launch
//!     Slug: 2024/launch
//!     Date: 2024-03-01
//! 002 Rust Tips
//!     Slug: rust-tips
//!     Date: 2024-02-10
//!     Small habits that keep borrow checker ...
//! ```
//!
//! ## Build
//!
//! ```text
//! blogs
//!     001 Launch → blogs/2024/launch/index.html
//!     002 Rust Tips → blogs/rust-tips/index.html
//! notes
//!     001 First Note → notes/first-note/index.html
//!
//! Search index → content/search/index.json (3 entries)
//! Generated 3 pages in 2 categories
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::collection::Collection;
use crate::pipeline::{BuildReport, CheckReport};
use crate::router::{RouteParams, RouteShape};
use crate::search::shortify;
use crate::types::{ContentItem, SearchEntry};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Item header: positional index + title. Untitled items show their slug in parens.
///
/// ```text
/// 001 Hello World
/// 002 (2024/launch)
/// ```
fn item_header(index: usize, item: &ContentItem) -> String {
    if item.title.is_empty() {
        format!("{} ({})", format_index(index), item.slug)
    } else {
        format!("{} {}", format_index(index), item.title)
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Show `path` relative to `root` when it lives inside it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

// ============================================================================
// list
// ============================================================================

/// Format a published collection, newest first.
pub fn format_collection_output(collection: &Collection, description_length: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({} published)",
        collection.category(),
        collection.len()
    )];
    for (i, item) in collection.items().iter().enumerate() {
        lines.push(item_header(i + 1, item));
        lines.push(format!("{}Slug: {}", indent(1), item.slug));
        if !item.date.is_empty() {
            lines.push(format!("{}Date: {}", indent(1), item.date));
        }
        if let Some(preview) = item
            .description
            .as_deref()
            .and_then(|d| shortify(d.trim(), description_length))
        {
            lines.push(format!("{}{}", indent(1), preview));
        }
    }
    lines
}

pub fn print_collection_output(collection: &Collection, description_length: usize) {
    for line in format_collection_output(collection, description_length) {
        println!("{}", line);
    }
}

// ============================================================================
// paths
// ============================================================================

/// Format the static paths of one route shape.
///
/// ```text
/// Nested (1 path)
///     001 2024 / launch
/// ```
pub fn format_paths_output(shape: RouteShape, params: &[RouteParams]) -> Vec<String> {
    let label = match shape {
        RouteShape::Flat => "Flat",
        RouteShape::Nested => "Nested",
    };
    let mut lines = vec![format!("{} ({})", label, plural(params.len(), "path", "paths"))];
    for (i, p) in params.iter().enumerate() {
        let shown = match p {
            RouteParams::Flat { slug } => slug.clone(),
            RouteParams::Nested { slugs } => slugs.join(" / "),
        };
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), shown));
    }
    lines
}

pub fn print_paths_output(shape: RouteShape, params: &[RouteParams]) {
    for line in format_paths_output(shape, params) {
        println!("{}", line);
    }
}

// ============================================================================
// show
// ============================================================================

/// Format one resolved item: metadata lines, a blank line, then the body.
pub fn format_item_output(item: &ContentItem) -> Vec<String> {
    let mut lines = vec![item.title.clone()];
    lines.push(format!("{}Slug: {}", indent(1), item.slug));
    if !item.date.is_empty() {
        lines.push(format!("{}Date: {}", indent(1), item.date));
    }
    if let Some(desc) = &item.description {
        lines.push(format!("{}Description: {}", indent(1), desc));
    }
    for (key, value) in &item.extra {
        lines.push(format!("{}{}: {}", indent(1), key, value));
    }
    lines.push(String::new());
    lines.extend(item.content.as_str().lines().map(str::to_string));
    lines
}

pub fn print_item_output(item: &ContentItem) {
    for line in format_item_output(item) {
        println!("{}", line);
    }
}

// ============================================================================
// index
// ============================================================================

/// Format the written search index.
pub fn format_index_output(
    entries: &[SearchEntry],
    index_path: &Path,
    root: &Path,
    description_length: usize,
) -> Vec<String> {
    let mut lines = vec![format!(
        "Search index \u{2192} {} ({})",
        display_path(index_path, root),
        plural(entries.len(), "entry", "entries")
    )];
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!(
            "{} {} [{}/{}]",
            format_index(i + 1),
            entry.title,
            entry.category,
            entry.slug
        ));
        if let Some(preview) = entry
            .description
            .as_deref()
            .and_then(|d| shortify(d.trim(), description_length))
        {
            lines.push(format!("{}{}", indent(1), preview));
        }
    }
    lines
}

pub fn print_index_output(
    entries: &[SearchEntry],
    index_path: &Path,
    root: &Path,
    description_length: usize,
) {
    for line in format_index_output(entries, index_path, root, description_length) {
        println!("{}", line);
    }
}

// ============================================================================
// build / check
// ============================================================================

/// Format a build report: pages per category, then the index and totals.
pub fn format_build_output(report: &BuildReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let mut total = 0;
    for category in &report.categories {
        lines.push(category.category.clone());
        for (i, page) in category.pages.iter().enumerate() {
            lines.push(format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                format_index(i + 1),
                page.title,
                page.path.to_string_lossy().replace('\\', "/")
            ));
        }
        total += category.pages.len();
    }
    lines.push(String::new());
    lines.push(format!(
        "Search index \u{2192} {} ({})",
        display_path(&report.index_path, root),
        plural(report.index_entries, "entry", "entries")
    ));
    lines.push(format!(
        "Generated {} in {}",
        plural(total, "page", "pages"),
        plural(report.categories.len(), "category", "categories")
    ));
    lines
}

pub fn print_build_output(report: &BuildReport, root: &Path) {
    for line in format_build_output(report, root) {
        println!("{}", line);
    }
}

pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    report
        .categories
        .iter()
        .map(|(name, published)| format!("{}: {} published", name, published))
        .collect()
}

pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::GeneratedPage;
    use crate::pipeline::CategoryReport;
    use crate::types::Body;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn item(slug: &str, title: &str, description: Option<&str>, date: &str) -> ContentItem {
        ContentItem {
            slug: slug.into(),
            title: title.into(),
            description: description.map(str::to_string),
            date: date.into(),
            draft: None,
            content: Body::Markdown("# Heading\n\nBody text.".into()),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn untitled_item_shows_slug() {
        assert_eq!(item_header(3, &item("2024/x", "", None, "")), "003 (2024/x)");
    }

    #[test]
    fn collection_listing() {
        let collection = Collection::from_items(
            "blogs",
            vec![
                item("old", "Old", None, "2023-01-01"),
                item("new", "New", Some("A fairly long description"), "2024-01-01"),
                item("undated", "Undated", None, ""),
            ],
        );
        let lines = format_collection_output(&collection, 8);
        assert_eq!(
            lines,
            vec![
                "blogs (3 published)",
                "001 New",
                "    Slug: new",
                "    Date: 2024-01-01",
                "    A fairly ...",
                "002 Old",
                "    Slug: old",
                "    Date: 2023-01-01",
                "003 Undated",
                "    Slug: undated",
            ]
        );
    }

    #[test]
    fn paths_listing() {
        let params = vec![RouteParams::Nested {
            slugs: vec!["2024".into(), "launch".into()],
        }];
        assert_eq!(
            format_paths_output(RouteShape::Nested, &params),
            vec!["Nested (1 path)", "    001 2024 / launch"]
        );
        assert_eq!(
            format_paths_output(RouteShape::Flat, &[]),
            vec!["Flat (0 paths)"]
        );
    }

    #[test]
    fn item_listing_includes_extra_and_body() {
        let mut it = item("hello", "Hello", Some("Greeting"), "2024-01-15");
        it.extra.insert("tags".into(), serde_json::json!(["a", "b"]));
        let lines = format_item_output(&it);
        assert_eq!(lines[0], "Hello");
        assert!(lines.contains(&"    Description: Greeting".to_string()));
        assert!(lines.contains(&"    tags: [\"a\",\"b\"]".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Body text."));
    }

    #[test]
    fn index_listing() {
        let root = Path::new("/site");
        let entries = vec![SearchEntry {
            slug: "hello".into(),
            title: "Hello".into(),
            description: Some("Short".into()),
            category: "blogs".into(),
        }];
        let lines = format_index_output(&entries, &root.join("content/index.json"), root, 70);
        assert_eq!(
            lines,
            vec![
                "Search index \u{2192} content/index.json (1 entry)",
                "001 Hello [blogs/hello]",
                "    Short",
            ]
        );
    }

    #[test]
    fn build_summary() {
        let root = Path::new("/site");
        let report = BuildReport {
            categories: vec![CategoryReport {
                category: "blogs".into(),
                pages: vec![GeneratedPage {
                    title: "Hello".into(),
                    slug: "hello".into(),
                    path: PathBuf::from("blogs/hello/index.html"),
                }],
            }],
            index_path: root.join("search.json"),
            index_entries: 1,
        };
        let lines = format_build_output(&report, root);
        assert_eq!(
            lines,
            vec![
                "blogs",
                "    001 Hello \u{2192} blogs/hello/index.html",
                "",
                "Search index \u{2192} search.json (1 entry)",
                "Generated 1 page in 1 category",
            ]
        );
    }

    #[test]
    fn check_summary() {
        let report = CheckReport {
            categories: vec![("blogs".into(), 3), ("notes".into(), 0)],
        };
        assert_eq!(
            format_check_output(&report),
            vec!["blogs: 3 published", "notes: 0 published"]
        );
    }
}
