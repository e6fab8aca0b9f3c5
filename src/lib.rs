//! # slugpress
//!
//! A markdown content core for statically generated sites. Each content
//! category is a directory of markdown files with YAML front matter; the file
//! tree is the data source and the relative path of a file is its slug.
//!
//! # Architecture
//!
//! ```text
//! content/blogs/**/*.md
//!     │  walk            every file under the category root
//!     ▼
//!     │  resolve         front matter + body → ContentItem (slug from path)
//!     ▼
//!     │  collection      drop drafts, sort newest-first (stable)
//!     ├──────────────►   router: static paths + slug lookup
//!     ├──────────────►   search: one JSON index across all categories
//!     ▼
//!     render + generate  markdown → sanitized HTML → dist/<category>/<slug>/index.html
//! ```
//!
//! Routing and the search index read the same published collection, so an
//! enumerated route always resolves and the index never lists a draft.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`walk`] | Recursive file listing, plus a one-level listing |
//! | [`front_matter`] | Splits `---` fenced YAML from the body, normalizes dates |
//! | [`content`] | [`content::Category`]: file name ↔ slug ↔ [`types::ContentItem`] |
//! | [`collection`] | Published, newest-first view of one category |
//! | [`render`] | GitHub-flavoured markdown to sanitized HTML |
//! | [`router`] | Static path enumeration and slug resolution for flat and nested routes |
//! | [`search`] | Search index build, atomic write, and the read-only process-wide index |
//! | [`generate`] | Standalone HTML page per published item, built with Maud |
//! | [`pipeline`] | [`pipeline::Project`]: build, check and lookups over a whole project |
//! | [`config`] | `slugpress.toml` loading, merging over stock defaults, validation |
//! | [`types`] | Records shared across stages (`ContentItem`, `SearchEntry`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Slugs Are Paths
//!
//! There is no `slug` front-matter key. A file's slug is its path relative to
//! the category root with the extension removed, so renaming a file is the
//! only way to move it, and a slug can always be turned back into exactly one
//! file. A `slug` key in front matter is ignored.
//!
//! ## Fail the Whole Build
//!
//! One malformed file fails its collection, and one failed collection fails
//! the build before any page or index is written.
//!
//! ## Dates Sort as Strings
//!
//! Dates are normalized once, at resolve time, using the configured strftime
//! format. Collections order by plain string comparison of the normalized
//! value, which is chronological for the default ISO `%Y-%m-%d`.
//!
//! ## Render Late
//!
//! Items carry their markdown body until something needs HTML. The two states
//! are separate [`types::Body`] variants, so a page writer can refuse raw
//! markdown and an item can't be rendered twice.

pub mod collection;
pub mod config;
pub mod content;
pub mod front_matter;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod router;
pub mod search;
pub mod types;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
