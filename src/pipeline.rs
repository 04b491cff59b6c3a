use crate::models::{Crawled, Warning};
use crate::output::{ChunkReport, ChunkedCsvWriter, OutputConfig};
use crate::scrapers::{
    BrowserConfig, CrawlResult, FieldExtractor, ListingConfig, ListingCrawler, RenderingSession, ReviewConfig,
    ReviewCrawler,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

pub const LISTINGS_BASENAME: &str = "metacritic_detailed_games_all_time";
pub const REVIEWS_BASENAME: &str = "metacritic_reviews_all_time";

/// Everything a run needs, with defaults matching the live catalog
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoutConfig {
    pub listing: ListingConfig,
    pub reviews: ReviewConfig,
    pub browser: BrowserConfig,
    pub output: OutputConfig,
    /// Stop after the listing phase
    pub skip_reviews: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub listings: usize,
    pub reviews: usize,
    pub listing_files: ChunkReport,
    pub review_files: ChunkReport,
    pub warnings: Vec<Warning>,
}

/// Crawl listings, write them, crawl reviews, write those.
///
/// Page and item failures end up in `warnings`; only output errors abort.
pub fn run<S>(config: &ScoutConfig, session: &mut S) -> CrawlResult<RunSummary>
where
    S: RenderingSession + ?Sized,
{
    let started_at = Utc::now();
    let extractor = FieldExtractor::new(&config.listing.site_origin)?;
    let writer = ChunkedCsvWriter::new(&config.output);

    info!("Crawling {} listing pages...", config.listing.pages);
    let listings = ListingCrawler::new(&config.listing, &extractor).crawl(session);
    info!("Collected {} games", listings.records.len());
    let listing_files = save(&writer, LISTINGS_BASENAME, &listings)?;

    let reviews = if config.skip_reviews {
        info!("Skipping review crawl");
        Crawled::default()
    } else {
        ReviewCrawler::new(&config.reviews, &extractor).crawl(session, &listings.records)
    };
    info!("Collected {} reviews", reviews.records.len());
    let review_files = save(&writer, REVIEWS_BASENAME, &reviews)?;

    let mut warnings = listings.warnings;
    warnings.extend(reviews.warnings);

    Ok(RunSummary {
        started_at,
        finished_at: Utc::now(),
        listings: listings.records.len(),
        reviews: reviews.records.len(),
        listing_files,
        review_files,
        warnings,
    })
}

/// Run the pipeline, then close the session whether or not the run succeeded.
///
/// A failure to close is logged; the run's own result is returned.
pub fn run_to_completion<S>(config: &ScoutConfig, session: &mut S) -> CrawlResult<RunSummary>
where
    S: RenderingSession + ?Sized,
{
    let result = run(config, session);
    if let Err(e) = session.close() {
        warn!("Failed to close browser cleanly: {}", e);
    }
    result
}

fn save<T: Serialize>(writer: &ChunkedCsvWriter<'_>, base: &str, crawled: &Crawled<T>) -> CrawlResult<ChunkReport> {
    if crawled.records.is_empty() {
        info!("No data found to save for '{}'", base);
    }
    writer.write(base, &crawled.records)
}
