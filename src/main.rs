//! blogsync: ingest markdown blog articles into a hosted content table.

mod article;
mod cli;
mod config;
mod error;
mod export;
mod frontmatter;
mod pipeline;
mod slug;
mod sources;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "blogsync",
    version,
    about = "Ingest markdown blog articles into a hosted content table"
)]
struct Cli {
    #[command(subcommand)]
    command: cli::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Store credentials may live in a local .env file
    dotenvy::dotenv().ok();

    // Initialize tracing with RUST_LOG env filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        cli::Commands::Doctor => cli::doctor::run().await,
        cli::Commands::Ingest { dir, draft, json } => cli::ingest::run(dir, draft, json).await,
        cli::Commands::Update {
            dir,
            with_metadata,
            json,
        } => cli::ingest::run_update(dir, with_metadata, json).await,
        cli::Commands::Export { dir, output, table } => cli::export::run(dir, output, table).await,
        cli::Commands::Show {
            slug,
            preview,
            json,
        } => cli::show::run(&slug, preview, json).await,
        cli::Commands::Slug { title } => cli::slug::run(&title),
    }
}
