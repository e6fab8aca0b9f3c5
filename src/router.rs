//! Slug routing and static path enumeration.
//!
//! A consumer generating pages ahead of time asks two questions of a category:
//! which routes exist ([`SlugRouter::static_paths`]), and what item sits behind
//! a route ([`SlugRouter::resolve_by_slug`]). Both answers come from the same
//! published [`Collection`], so every enumerated route resolves and nothing
//! else does.
//!
//! ## Route shapes
//!
//! Consumers typically declare two routes per category: a flat one taking a
//! single `slug` (`/blogs/hello`) and a nested catch-all taking `slugs`
//! (`/blogs/2024/launch`). [`NestedPolicy`] decides how slugs are split
//! between them:
//!
//! | Policy | Flat route gets | Nested route gets |
//! |--------|-----------------|-------------------|
//! | `Partitioned` | single-segment slugs | multi-segment slugs |
//! | `Unified` | nothing | every slug |
//!
//! Under either policy each slug is generated exactly once.

use crate::collection::Collection;
use crate::content::{Category, ContentError};
use crate::types::ContentItem;
use serde::{Deserialize, Serialize};

/// How enumerated slugs are split between the flat and nested routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestedPolicy {
    /// Flat and nested slugs are distinct namespaces, split by segment count.
    #[default]
    Partitioned,
    /// One catch-all route serves slugs of any depth.
    Unified,
}

/// Which route declaration paths are being generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteShape {
    Flat,
    Nested,
}

/// Parameters for one statically generated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RouteParams {
    Flat { slug: String },
    Nested { slugs: Vec<String> },
}

impl RouteParams {
    /// The slug these parameters address.
    pub fn slug(&self) -> String {
        match self {
            RouteParams::Flat { slug } => slug.clone(),
            RouteParams::Nested { slugs } => slugs.join("/"),
        }
    }
}

/// A lookup request: a whole slug or its ordered segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugRequest {
    Slug(String),
    Segments(Vec<String>),
}

impl SlugRequest {
    pub fn joined(&self) -> String {
        match self {
            SlugRequest::Slug(s) => s.clone(),
            SlugRequest::Segments(segs) => segs.join("/"),
        }
    }
}

impl From<&str> for SlugRequest {
    fn from(slug: &str) -> Self {
        SlugRequest::Slug(slug.to_string())
    }
}

impl From<String> for SlugRequest {
    fn from(slug: String) -> Self {
        SlugRequest::Slug(slug)
    }
}

impl From<Vec<String>> for SlugRequest {
    fn from(segments: Vec<String>) -> Self {
        SlugRequest::Segments(segments)
    }
}

impl From<&[&str]> for SlugRequest {
    fn from(segments: &[&str]) -> Self {
        SlugRequest::Segments(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&RouteParams> for SlugRequest {
    fn from(params: &RouteParams) -> Self {
        match params {
            RouteParams::Flat { slug } => SlugRequest::Slug(slug.clone()),
            RouteParams::Nested { slugs } => SlugRequest::Segments(slugs.clone()),
        }
    }
}

/// Split published slugs into route parameters for one route shape.
pub fn partition_paths<S: AsRef<str>>(
    slugs: &[S],
    shape: RouteShape,
    policy: NestedPolicy,
) -> Vec<RouteParams> {
    slugs
        .iter()
        .map(AsRef::as_ref)
        .filter(|slug| {
            let nested = slug.contains('/');
            match (policy, shape) {
                (NestedPolicy::Partitioned, RouteShape::Flat) => !nested,
                (NestedPolicy::Partitioned, RouteShape::Nested) => nested,
                (NestedPolicy::Unified, RouteShape::Flat) => false,
                (NestedPolicy::Unified, RouteShape::Nested) => true,
            }
        })
        .map(|slug| match shape {
            RouteShape::Flat => RouteParams::Flat {
                slug: slug.to_string(),
            },
            RouteShape::Nested => RouteParams::Nested {
                slugs: slug.split('/').map(str::to_string).collect(),
            },
        })
        .collect()
}

/// Routes slugs for one category.
#[derive(Debug, Clone)]
pub struct SlugRouter {
    category: Category,
    policy: NestedPolicy,
}

impl SlugRouter {
    pub fn new(category: Category, policy: NestedPolicy) -> Self {
        Self { category, policy }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn policy(&self) -> NestedPolicy {
        self.policy
    }

    /// Every published slug, newest item first.
    pub fn resolve_slugs(&self) -> Result<Vec<String>, ContentError> {
        let collection = Collection::load(&self.category)?;
        Ok(collection.slugs().into_iter().map(str::to_string).collect())
    }

    /// Route parameters for every page the given route shape must generate.
    pub fn static_paths(&self, shape: RouteShape) -> Result<Vec<RouteParams>, ContentError> {
        let slugs = self.resolve_slugs()?;
        Ok(partition_paths(&slugs, shape, self.policy))
    }

    /// Resolve a published item by slug or segments.
    ///
    /// Drafts and unknown slugs are both `NotFound`: only enumerated routes
    /// resolve.
    pub fn resolve_by_slug(
        &self,
        request: impl Into<SlugRequest>,
    ) -> Result<ContentItem, ContentError> {
        let slug = request.into().joined();
        let item = self.category.resolve_by_slug(&slug)?;
        if !item.is_published() {
            return Err(ContentError::NotFound {
                category: self.category.name().to_string(),
                slug,
            });
        }
        Ok(item)
    }

    /// Slugs whose enumerated route does not resolve back to the same slug.
    ///
    /// Empty when enumeration and resolution agree.
    pub fn mismatches(&self) -> Result<Vec<String>, ContentError> {
        let mut bad = Vec::new();
        for shape in [RouteShape::Flat, RouteShape::Nested] {
            for params in self.static_paths(shape)? {
                match self.resolve_by_slug(&params) {
                    Ok(item) if item.slug == params.slug() => {}
                    Ok(_) | Err(ContentError::NotFound { .. }) => bad.push(params.slug()),
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(bad)
    }
}
