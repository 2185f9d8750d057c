//! `blogsync show`: inspect the stored record behind a slug.

use std::fmt;

use serde::Serialize;

use crate::config::load_config;
use crate::error::BlogsyncError;
use crate::store::rest::RestStore;
use crate::store::ContentStore;

/// What `show` reports about one record.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub id: String,
    pub title: Option<String>,
    pub published: Option<bool>,
    /// Content length in characters.
    pub content_length: usize,
    pub preview: Option<String>,
}

impl fmt::Display for RecordSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Id: {}", self.id)?;
        writeln!(f, "Title: {}", self.title.as_deref().unwrap_or("(none)"))?;
        match self.published {
            Some(published) => writeln!(f, "Published: {published}")?,
            None => writeln!(f, "Published: (unknown)")?,
        }
        writeln!(f, "Content length: {}", self.content_length)?;
        match &self.preview {
            Some(preview) => writeln!(f, "Content preview: {preview}..."),
            None => writeln!(f, "Content preview: NO CONTENT"),
        }
    }
}

pub async fn run(slug: &str, preview_chars: usize, json: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    let store = RestStore::new(&config.store()?)?;

    let Some(summary) = summarize(&store, slug, preview_chars).await? else {
        eprintln!("No record with slug {slug}");
        std::process::exit(1);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(())
}

/// Look up `slug` and summarize the record, keeping the first
/// `preview_chars` characters of its content.
async fn summarize(
    store: &dyn ContentStore,
    slug: &str,
    preview_chars: usize,
) -> Result<Option<RecordSummary>, BlogsyncError> {
    let Some(record) = store.find_by_slug(slug).await? else {
        return Ok(None);
    };

    let content = record.content.as_deref().unwrap_or_default();
    Ok(Some(RecordSummary {
        id: record.id.to_string(),
        title: record.title,
        published: record.published,
        content_length: content.chars().count(),
        preview: (!content.is_empty()).then(|| content.chars().take(preview_chars).collect()),
    }))
}
