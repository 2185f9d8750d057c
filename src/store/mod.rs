//! Content store abstraction.
//!
//! The pipeline only needs three capabilities from the remote table: look a
//! record up by slug, insert a new article, and patch an existing record.

pub mod rest;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::article::Article;
use crate::error::BlogsyncError;

/// Primary key of a remote record. Tables use either serial or UUID keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// A row as returned by the store. Other columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub id: RecordId,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Insert payload: every article field plus write timestamps.
#[derive(Debug, Serialize)]
pub struct NewArticle<'a> {
    #[serde(flatten)]
    pub article: &'a Article,
    pub created_at: String,
    pub updated_at: String,
}

impl<'a> NewArticle<'a> {
    pub fn new(article: &'a Article, now: DateTime<Utc>) -> Self {
        let stamp = now.to_rfc3339();
        Self {
            article,
            created_at: stamp.clone(),
            updated_at: stamp,
        }
    }
}

/// Partial update written in update mode.
///
/// Fields left as `None` are not sent, so the remote values stay as they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleUpdate {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub updated_at: String,
}

impl ArticleUpdate {
    /// Body-only update, optionally carrying title and excerpt along.
    pub fn from_article(article: &Article, with_metadata: bool, now: DateTime<Utc>) -> Self {
        Self {
            content: article.content.clone(),
            title: with_metadata.then(|| article.title.clone()),
            excerpt: with_metadata.then(|| article.excerpt.clone()),
            updated_at: now.to_rfc3339(),
        }
    }
}

/// Remote table of articles keyed by `id`, with a (mostly) unique `slug`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Find the record published under `slug`, if any.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<RemoteRecord>, BlogsyncError>;

    /// Insert a new record. A unique-slug conflict is `AmbiguousSlug`.
    async fn insert(&self, record: &NewArticle<'_>) -> Result<RemoteRecord, BlogsyncError>;

    /// Patch the record with `id`.
    async fn update(
        &self,
        id: &RecordId,
        fields: &ArticleUpdate,
    ) -> Result<RemoteRecord, BlogsyncError>;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn article() -> Article {
        Article {
            title: "Solar Basics".into(),
            excerpt: "Short".into(),
            content: "Body".into(),
            author: "Sam".into(),
            read_time: "3 min read".into(),
            category: "Guides".into(),
            image: String::new(),
            slug: "solar-basics".into(),
            published: true,
        }
    }

    #[test]
    fn test_record_id_accepts_int_or_uuid() {
        let rec: RemoteRecord = serde_json::from_str(r#"{"id": 42, "slug": "a"}"#).unwrap();
        assert_eq!(rec.id, RecordId::Int(42));
        assert_eq!(rec.id.to_string(), "42");

        let rec: RemoteRecord = serde_json::from_str(
            r#"{"id": "0b6a4c1e-5d1b-4f3e-9a55-2c1f0b7d3e11", "author": "ignored"}"#,
        )
        .unwrap();
        assert_eq!(rec.id.to_string(), "0b6a4c1e-5d1b-4f3e-9a55-2c1f0b7d3e11");
        assert_eq!(rec.slug, None);
    }

    #[test]
    fn test_new_article_payload() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let article = article();
        let value = serde_json::to_value(NewArticle::new(&article, now)).unwrap();

        assert_eq!(value["slug"], "solar-basics");
        assert_eq!(value["published"], true);
        assert_eq!(value["read_time"], "3 min read");
        assert_eq!(value["created_at"], "2025-01-02T03:04:05+00:00");
        assert_eq!(value["created_at"], value["updated_at"]);
    }

    #[test]
    fn test_update_payload_body_only() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let value =
            serde_json::to_value(ArticleUpdate::from_article(&article(), false, now)).unwrap();
        let obj = value.as_object().unwrap();

        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, ["content", "updated_at"]);
    }

    #[test]
    fn test_update_payload_with_metadata() {
        let update = ArticleUpdate::from_article(&article(), true, Utc::now());
        assert_eq!(update.title.as_deref(), Some("Solar Basics"));
        assert_eq!(update.excerpt.as_deref(), Some("Short"));

        let value = serde_json::to_value(&update).unwrap();
        assert!(value.get("slug").is_none());
        assert!(value.get("author").is_none());
    }
}
