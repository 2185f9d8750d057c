//! Article ingestion pipeline.
//!
//! Reads every document from a source in file-name order, parses it into an
//! [`Article`] and reconciles it against a [`ContentStore`]. Two modes:
//!
//! - **insert**: add articles whose slug is not in the store yet, skip the
//!   rest. Existing records are never overwritten.
//! - **update**: find the record by the slug it was originally published
//!   under and rewrite its body (optionally title and excerpt too).
//!
//! A failure on one document is reported and the batch moves on. Only an
//! unreadable source aborts the run.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::article::Article;
use crate::error::BlogsyncError;
use crate::sources::{Document, DocumentSource};
use crate::store::{ArticleUpdate, ContentStore, NewArticle};

/// How existing records are treated.
#[derive(Debug, Clone)]
pub enum Mode {
    /// Insert missing articles, skip slugs that already exist.
    Insert,
    /// Rewrite records located by their prior slug.
    Update {
        /// File name -> slug the record was published under. Unmapped files
        /// fall back to the slug derived from their title.
        slug_map: BTreeMap<String, String>,
        /// Also overwrite title and excerpt.
        with_metadata: bool,
    },
}

/// Options for one batch run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub mode: Mode,
    /// `published` flag for newly inserted articles.
    pub published: bool,
}

/// Terminal state of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Outcome {
    Inserted { slug: String },
    Updated { slug: String },
    Skipped { slug: String, reason: String },
    Failed { subject: String, error: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inserted { slug } => write!(f, "inserted {slug}"),
            Self::Updated { slug } => write!(f, "updated {slug}"),
            Self::Skipped { slug, reason } => write!(f, "skipped {slug} ({reason})"),
            Self::Failed { subject, error } => write!(f, "failed {subject}: {error}"),
        }
    }
}

/// One line of the batch report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub file: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Per-document outcomes in processing order.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BatchReport {
    pub entries: Vec<ReportEntry>,
}

impl BatchReport {
    fn record(&mut self, file: String, outcome: Outcome) {
        match &outcome {
            Outcome::Failed { .. } => warn!("{file}: {outcome}"),
            _ => info!("{file}: {outcome}"),
        }
        self.entries.push(ReportEntry { file, outcome });
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    pub fn inserted(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Inserted { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Updated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }
}

/// Run one sequential pass over `source`.
///
/// Returns an error only if the source cannot be enumerated.
pub async fn run_batch(
    source: &dyn DocumentSource,
    store: &dyn ContentStore,
    options: &IngestOptions,
) -> Result<BatchReport, BlogsyncError> {
    let paths = source.list_documents()?;
    info!(
        "Processing {} documents from {}",
        paths.len(),
        source.root_path().display()
    );

    let mut report = BatchReport::default();

    for path in &paths {
        let file = path.to_string_lossy().into_owned();

        let doc = match source.read_document(path) {
            Ok(doc) => doc,
            Err(e) => {
                report.record(
                    file.clone(),
                    Outcome::Failed {
                        subject: file,
                        error: e.to_string(),
                    },
                );
                continue;
            }
        };

        let outcome = process_document(&doc, store, options).await;
        report.record(file, outcome);
    }

    Ok(report)
}

/// Parse and reconcile a single document.
async fn process_document(
    doc: &Document,
    store: &dyn ContentStore,
    options: &IngestOptions,
) -> Outcome {
    let article = match Article::from_document(&doc.path, &doc.raw_text, options.published) {
        Ok(article) => article,
        Err(e) => {
            return Outcome::Failed {
                subject: doc.file_name(),
                error: e.to_string(),
            }
        }
    };

    let result = match &options.mode {
        Mode::Insert => reconcile_insert(store, &article).await,
        Mode::Update {
            slug_map,
            with_metadata,
        } => {
            let lookup = lookup_slug(slug_map, &doc.file_name(), &article);
            reconcile_update(store, &article, &lookup, *with_metadata).await
        }
    };

    result.unwrap_or_else(|e| Outcome::Failed {
        subject: article.title.clone(),
        error: e.to_string(),
    })
}

/// Slug the record for `file` was published under.
fn lookup_slug(slug_map: &BTreeMap<String, String>, file: &str, article: &Article) -> String {
    match slug_map.get(file) {
        Some(slug) => slug.clone(),
        None => {
            debug!("{file}: not in slug map, using derived slug {}", article.slug);
            article.slug.clone()
        }
    }
}

/// Insert `article` unless its slug is already taken.
async fn reconcile_insert(
    store: &dyn ContentStore,
    article: &Article,
) -> Result<Outcome, BlogsyncError> {
    if let Some(existing) = store.find_by_slug(&article.slug).await? {
        return Ok(Outcome::Skipped {
            slug: article.slug.clone(),
            reason: format!("already exists as id {}", existing.id),
        });
    }

    match store.insert(&NewArticle::new(article, Utc::now())).await {
        Ok(_) => Ok(Outcome::Inserted {
            slug: article.slug.clone(),
        }),
        // Lost a race with another writer, or a duplicate the lookup missed
        Err(BlogsyncError::AmbiguousSlug(slug)) => Ok(Outcome::Skipped {
            slug,
            reason: "slug already taken".into(),
        }),
        Err(e) => Err(e),
    }
}

/// Rewrite the body of the record published under `lookup_slug`.
async fn reconcile_update(
    store: &dyn ContentStore,
    article: &Article,
    lookup_slug: &str,
    with_metadata: bool,
) -> Result<Outcome, BlogsyncError> {
    let existing = store
        .find_by_slug(lookup_slug)
        .await?
        .ok_or_else(|| BlogsyncError::RecordNotFound(lookup_slug.to_string()))?;
    debug!(
        "{lookup_slug}: replacing content of id {} (last updated {})",
        existing.id,
        existing.updated_at.as_deref().unwrap_or("never")
    );

    let fields = ArticleUpdate::from_article(article, with_metadata, Utc::now());
    store.update(&existing.id, &fields).await?;

    Ok(Outcome::Updated {
        slug: lookup_slug.to_string(),
    })
}
