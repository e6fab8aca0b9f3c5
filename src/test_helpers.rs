//! Shared test utilities for the slugpress test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let collection = load_collection(tmp.path(), "blogs");
//!
//! let item = find_item(&collection, "hello");
//! assert_eq!(item.title, "Hello World");
//! assert_eq!(slugs(&collection), vec!["2024/launch", "rust-tips", "hello"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::collection::Collection;
use crate::config;
use crate::content::Category;
use crate::types::ContentItem;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/project/` to a temp directory and return it.
///
/// The copy is a complete project root: `slugpress.toml` plus `content/`.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `content` to `rel` under `root`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Load a configured category of the project at `root`.
pub fn load_collection(root: &Path, category: &str) -> Collection {
    let config = config::load_config(root).unwrap();
    let category = Category::from_config(&config, root, category).unwrap();
    Collection::load(&category).unwrap()
}

/// Find a published item by slug. Panics if not found.
pub fn find_item<'a>(collection: &'a Collection, slug: &str) -> &'a ContentItem {
    collection.get(slug).unwrap_or_else(|| {
        panic!(
            "item '{slug}' not found in '{}'. Available: {:?}",
            collection.category(),
            collection.slugs()
        )
    })
}

/// All published slugs in collection order.
pub fn slugs(collection: &Collection) -> Vec<&str> {
    collection.slugs()
}
