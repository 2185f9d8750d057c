//! CLI command definitions and handlers.

pub mod doctor;
pub mod export;
pub mod ingest;
pub mod show;
pub mod slug;

use std::path::PathBuf;

use clap::Subcommand;

use crate::pipeline::BatchReport;

#[derive(Subcommand)]
pub enum Commands {
    /// Check configuration, store reachability and the posts folder
    Doctor,

    /// Insert new articles; articles whose slug already exists are skipped
    Ingest {
        /// Folder of markdown articles (default: posts.directory from config)
        dir: Option<PathBuf>,

        /// Insert as unpublished drafts
        #[arg(long)]
        draft: bool,

        /// Print the batch report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite the body of articles already in the store
    Update {
        /// Folder of markdown articles (default: posts.directory from config)
        dir: Option<PathBuf>,

        /// Also overwrite title and excerpt
        #[arg(long)]
        with_metadata: bool,

        /// Print the batch report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write SQL INSERT statements instead of calling the store
    Export {
        /// Folder of markdown articles (default: posts.directory from config)
        dir: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Table name (default: store.table from config)
        #[arg(long)]
        table: Option<String>,
    },

    /// Show title, published flag and a content preview for a stored slug
    Show {
        /// Slug of the stored article
        slug: String,

        /// Number of content characters to preview
        #[arg(long, default_value_t = 200)]
        preview: usize,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the slug derived from a title
    Slug {
        /// Article title
        title: String,
    },
}

/// Print the report and its summary; exit non-zero if any document failed.
fn finish(report: &BatchReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    }

    eprintln!(
        "Done: {} inserted, {} updated, {} skipped",
        report.inserted(),
        report.updated(),
        report.skipped()
    );
    if report.failed() > 0 {
        eprintln!("{} documents failed", report.failed());
        std::process::exit(1);
    }

    Ok(())
}
