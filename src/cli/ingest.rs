//! `blogsync ingest` and `blogsync update`: batch reconciliation commands.

use std::path::PathBuf;

use crate::config::{load_config, AppConfig};
use crate::pipeline::{run_batch, IngestOptions, Mode};
use crate::sources::markdown::MarkdownFolderSource;
use crate::store::rest::RestStore;

pub async fn run(dir: Option<PathBuf>, draft: bool, json: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    let options = IngestOptions {
        mode: Mode::Insert,
        published: config.published && !draft,
    };
    execute(config, dir, options, json).await
}

pub async fn run_update(
    dir: Option<PathBuf>,
    with_metadata: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config()?;
    let options = IngestOptions {
        mode: Mode::Update {
            slug_map: config.slug_map.clone(),
            with_metadata,
        },
        published: config.published,
    };
    execute(config, dir, options, json).await
}

async fn execute(
    config: AppConfig,
    dir: Option<PathBuf>,
    options: IngestOptions,
    json: bool,
) -> anyhow::Result<()> {
    let store = RestStore::new(&config.store()?)?;
    let source = MarkdownFolderSource::new(config.posts_dir_or(dir), config.extensions.clone());

    let report = run_batch(&source, &store, &options).await?;
    super::finish(&report, json)
}
