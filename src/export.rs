//! SQL script export.
//!
//! Renders articles as `INSERT` statements for pasting into the hosted
//! database's SQL editor when the REST endpoint is not an option.

use tracing::warn;

use crate::article::Article;
use crate::error::BlogsyncError;
use crate::sources::DocumentSource;

const COLUMNS: &str =
    "title, excerpt, content, author, read_time, category, image, slug, published, created_at, updated_at";

/// Read and parse every document, skipping the ones that fail.
pub fn load_articles(
    source: &dyn DocumentSource,
    published: bool,
) -> Result<Vec<Article>, BlogsyncError> {
    let mut articles = Vec::new();

    for path in source.list_documents()? {
        let parsed = source
            .read_document(&path)
            .and_then(|doc| Article::from_document(&doc.path, &doc.raw_text, published));
        match parsed {
            Ok(article) => articles.push(article),
            Err(e) => warn!("Skipping {}: {e}", path.display()),
        }
    }

    Ok(articles)
}

/// Render one `INSERT` per article, in order.
pub fn render_sql(articles: &[Article], table: &str) -> Result<String, BlogsyncError> {
    if !is_plain_identifier(table) {
        return Err(BlogsyncError::Config(format!(
            "Refusing to export into table name {table:?}"
        )));
    }

    let statements: Vec<String> = articles
        .iter()
        .map(|a| {
            let values = [
                &a.title,
                &a.excerpt,
                &a.content,
                &a.author,
                &a.read_time,
                &a.category,
                &a.image,
                &a.slug,
            ]
            .iter()
            .map(|v| format!("    {},", quote(v)))
            .collect::<Vec<_>>()
            .join("\n");

            format!(
                "INSERT INTO {table} ({COLUMNS})\nVALUES (\n{values}\n    {},\n    NOW(),\n    NOW()\n);",
                a.published
            )
        })
        .collect();

    let mut out = String::from("-- SQL statements to insert blog posts\n");
    out.push_str("-- Run these in your database SQL editor\n\n");
    out.push_str(&statements.join("\n\n"));
    out.push('\n');
    Ok(out)
}

/// Single-quoted SQL string literal.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `schema.table` style names only.
fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            part.chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
