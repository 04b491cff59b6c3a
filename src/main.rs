mod models;
mod output;
mod pipeline;
mod scrapers;

use anyhow::Context;
use clap::Parser;
use pipeline::{RunSummary, ScoutConfig};
use scrapers::ChromeSession;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Crawl the Metacritic game catalog and its user reviews into CSV files.
///
/// Every option has a default, so a bare run crawls the full catalog.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Number of listing pages to visit, starting at page 1
    #[arg(long, env = "GAME_SCOUT_PAGES")]
    pages: Option<u32>,

    /// Listing URL template; `{}` is replaced by the page number
    #[arg(long, env = "GAME_SCOUT_BASE_URL")]
    base_url: Option<String>,

    /// Directory for the CSV output
    #[arg(long, env = "GAME_SCOUT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Maximum reviews kept per game
    #[arg(long)]
    max_reviews: Option<usize>,

    /// Size in MiB above which later CSV chunks shrink
    #[arg(long)]
    max_file_mib: Option<u64>,

    /// Rows in the first CSV chunk
    #[arg(long)]
    chunk_rows: Option<usize>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Chrome binary to launch instead of the auto-detected one
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Only crawl and save the listings
    #[arg(long)]
    skip_reviews: bool,
}

impl Cli {
    fn into_config(self) -> ScoutConfig {
        let mut config = ScoutConfig::default();
        if let Some(pages) = self.pages {
            config.listing.pages = pages;
        }
        if let Some(base_url) = self.base_url {
            config.listing.base_url = base_url;
        }
        if let Some(dir) = self.output_dir {
            config.output.dir = dir;
        }
        if let Some(max) = self.max_reviews {
            config.reviews.max_reviews_per_item = max;
        }
        if let Some(mib) = self.max_file_mib {
            config.output.max_file_bytes = mib.saturating_mul(1024 * 1024);
        }
        if let Some(rows) = self.chunk_rows {
            config.output.initial_chunk_rows = rows;
        }
        config.browser.headless = !self.headed;
        config.browser.chrome_path = self.chrome_path;
        config.skip_reviews = self.skip_reviews;
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().into_config();

    info!("🎮 Game Scout - Metacritic catalog scraper");
    info!("==========================================");
    debug!("Config: {}", serde_json::to_string(&config).unwrap_or_default());

    let started = Instant::now();

    // The browser API blocks, so the whole crawl runs off the async workers.
    let summary = tokio::task::spawn_blocking(move || -> anyhow::Result<RunSummary> {
        let mut session = ChromeSession::launch(&config.browser).context("Failed to start browser session")?;
        Ok(pipeline::run_to_completion(&config, &mut session)?)
    })
    .await
    .context("Crawl task panicked")??;

    report(&summary);
    debug!("Run summary: {}", serde_json::to_string_pretty(&summary).unwrap_or_default());
    info!("Total execution time: {:.2} seconds", started.elapsed().as_secs_f64());

    Ok(())
}

fn report(summary: &RunSummary) {
    info!("✅ Scraped {} games and {} reviews", summary.listings, summary.reviews);
    for files in [&summary.listing_files, &summary.review_files] {
        info!("💾 {}: {} file(s), {} rows", files.base, files.file_count(), files.rows());
    }
    if !summary.warnings.is_empty() {
        warn!("{} pages, items or cards were skipped:", summary.warnings.len());
        for warning in &summary.warnings {
            warn!("  {}", warning);
        }
    }
    info!(
        "Run window: {} -> {}",
        summary.started_at.to_rfc3339(),
        summary.finished_at.to_rfc3339()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_uses_defaults() {
        let config = Cli::try_parse_from(["game-scout"]).unwrap().into_config();

        assert_eq!(config.listing.pages, 50);
        assert_eq!(config.reviews.max_reviews_per_item, 1000);
        assert_eq!(config.output.initial_chunk_rows, 10_000);
        assert_eq!(config.output.max_file_bytes, 20 * 1024 * 1024);
        assert!(config.browser.headless);
        assert!(!config.skip_reviews);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Cli::try_parse_from([
            "game-scout",
            "--pages",
            "3",
            "--max-file-mib",
            "5",
            "--headed",
            "--skip-reviews",
        ])
        .unwrap()
        .into_config();

        assert_eq!(config.listing.pages, 3);
        assert_eq!(config.output.max_file_bytes, 5 * 1024 * 1024);
        assert!(!config.browser.headless);
        assert!(config.skip_reviews);
    }
}
