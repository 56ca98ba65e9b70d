//! Blog content listing
//!
//! Posts are described by a JSON manifest:
//!
//! ```json
//! { "posts": [ { "slug": "launch", "title": "...", "description": "...",
//!                "published_on": "2024-03-01" } ] }
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// A single blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    /// URL segment under `/blog/`
    pub slug: String,

    pub title: String,

    pub description: String,

    pub published_on: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl BlogPost {
    /// Date of the most recent change
    pub fn last_modified(&self) -> NaiveDate {
        self.updated_on.unwrap_or(self.published_on)
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    posts: Vec<BlogPost>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContentError {
    #[error("Invalid slug {0:?}: use lowercase letters, digits and '-'")]
    InvalidSlug(String),

    #[error("Duplicate slug {0:?}")]
    DuplicateSlug(String),
}

/// All published posts, newest first
#[derive(Debug, Clone, Default)]
pub struct BlogIndex {
    posts: Vec<BlogPost>,
}

impl BlogIndex {
    /// Build an index, validating slugs and ordering newest first
    pub fn new(mut posts: Vec<BlogPost>) -> std::result::Result<Self, ContentError> {
        let mut seen = HashSet::new();
        for post in &posts {
            if !is_valid_slug(&post.slug) {
                return Err(ContentError::InvalidSlug(post.slug.clone()));
            }
            if !seen.insert(post.slug.as_str()) {
                return Err(ContentError::DuplicateSlug(post.slug.clone()));
            }
        }

        posts.sort_by(|a, b| {
            b.published_on
                .cmp(&a.published_on)
                .then_with(|| a.slug.cmp(&b.slug))
        });

        Ok(Self { posts })
    }

    /// Load the index from a manifest file. A missing file is an empty blog.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Blog manifest does not exist: {}", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read blog manifest: {}", path.display()))?;

        let manifest: Manifest = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse blog manifest: {}", path.display()))?;

        let index = Self::new(manifest.posts)
            .with_context(|| format!("Invalid blog manifest: {}", path.display()))?;

        info!("Loaded {} blog posts from {}", index.len(), path.display());
        Ok(index)
    }

    pub fn posts(&self) -> &[BlogPost] {
        &self.posts
    }

    pub fn find(&self, slug: &str) -> Option<&BlogPost> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
