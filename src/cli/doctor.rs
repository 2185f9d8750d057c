//! `blogsync doctor`: health check command.

use crate::config::{load_config, AppConfig};
use crate::sources::markdown::MarkdownFolderSource;
use crate::sources::DocumentSource;
use crate::store::rest::RestStore;

pub async fn run() -> anyhow::Result<()> {
    eprintln!("blogsync doctor");
    eprintln!("===============\n");

    // 1. Config
    eprint!("Config ... ");
    let config = match load_config() {
        Ok(config) => {
            let path = AppConfig::config_path();
            if path.exists() {
                eprintln!("OK ({})", path.display());
            } else {
                eprintln!("DEFAULTS (no {})", path.display());
            }
            eprintln!("  Table: {}", config.table);
            eprintln!("  Posts dir: {}", config.posts_dir.display());
            eprintln!("  Slug map entries: {}", config.slug_map.len());
            config
        }
        Err(e) => {
            eprintln!("FAILED: {e}");
            return Ok(());
        }
    };

    // 2. Store
    eprint!("\nStore ... ");
    match config.store() {
        Ok(store_config) => match RestStore::new(&store_config) {
            Ok(store) => match store.ping().await {
                Ok(true) => eprintln!("OK ({})", store_config.url),
                Ok(false) => {
                    eprintln!("UNREACHABLE ({})", store_config.url);
                    eprintln!(
                        "  Check the URL, the key and that table {} exists.",
                        store_config.table
                    );
                }
                Err(e) => eprintln!("ERROR: {e}"),
            },
            Err(e) => eprintln!("ERROR: {e}"),
        },
        Err(e) => eprintln!("NOT CONFIGURED\n  {e}"),
    }

    // 3. Posts
    eprint!("\nPosts ... ");
    let source = MarkdownFolderSource::new(&config.posts_dir, config.extensions.clone());
    match source.list_documents() {
        Ok(docs) => {
            eprintln!("OK ({})", source.root_path().display());
            eprintln!("  Documents: {} ({})", docs.len(), config.extensions.join(", "));
        }
        Err(e) => eprintln!("MISSING: {e}"),
    }

    eprintln!();
    Ok(())
}
