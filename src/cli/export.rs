//! `blogsync export`: render articles as SQL.

use std::path::PathBuf;

use anyhow::Context;

use crate::config::load_config;
use crate::export::{load_articles, render_sql};
use crate::sources::markdown::MarkdownFolderSource;

pub async fn run(
    dir: Option<PathBuf>,
    output: Option<PathBuf>,
    table: Option<String>,
) -> anyhow::Result<()> {
    let config = load_config()?;
    let source = MarkdownFolderSource::new(config.posts_dir_or(dir), config.extensions.clone());
    let table = table.unwrap_or_else(|| config.table.clone());

    let articles = load_articles(&source, config.published)?;
    let sql = render_sql(&articles, &table)?;

    match output {
        Some(path) => {
            std::fs::write(&path, sql)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Wrote {} INSERT statements to {}",
                articles.len(),
                path.display()
            );
        }
        None => print!("{sql}"),
    }

    Ok(())
}
