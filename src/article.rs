//! Article entity derived from a parsed document.

use std::path::Path;

use serde::Serialize;

use crate::error::BlogsyncError;
use crate::frontmatter::parse_document;
use crate::slug::slugify;

/// One blog article, ready for reconciliation against the store.
///
/// `slug` is derived from `title` and acts as the business key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub read_time: String,
    pub category: String,
    pub image: String,
    pub slug: String,
    pub published: bool,
}

impl Article {
    /// Parse `raw_text` into an article.
    ///
    /// Fails with `MalformedDocument` when the frontmatter is incomplete or
    /// the title yields an empty slug. `path` is used for diagnostics only.
    pub fn from_document(
        path: &Path,
        raw_text: &str,
        published: bool,
    ) -> Result<Self, BlogsyncError> {
        let parsed =
            parse_document(raw_text).map_err(|e| BlogsyncError::malformed(path, e.to_string()))?;
        let meta = parsed.metadata;

        let slug = slugify(&meta.title);
        if slug.is_empty() {
            let reason = if meta.title.is_empty() {
                "missing title".to_string()
            } else {
                format!("title {:?} yields an empty slug", meta.title)
            };
            return Err(BlogsyncError::malformed(path, reason));
        }

        Ok(Self {
            title: meta.title,
            excerpt: meta.excerpt,
            content: parsed.body,
            author: meta.author,
            read_time: meta.read_time,
            category: meta.category,
            image: meta.image,
            slug,
            published,
        })
    }
}
