use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use store::{load_settings, LandingStore, RestStore};

/// Offline build step: fetch the published portfolio once and serialize it
/// so production page loads can skip the live query.
#[derive(Parser, Debug)]
struct Cli {
    /// Output path; defaults to the configured snapshot path.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();
    let settings = load_settings();
    let out = cli
        .out
        .unwrap_or_else(|| PathBuf::from(&settings.snapshot_path));

    let store = RestStore::new(&settings);
    let items = store
        .list_portfolio_items(true)
        .await
        .context("fetching published portfolio items")?;

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating snapshot directory '{}'", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(&items).context("serializing snapshot")?;
    fs::write(&out, json)
        .with_context(|| format!("writing snapshot to '{}'", out.display()))?;

    println!("cached {} portfolio items to {}", items.len(), out.display());
    Ok(())
}
