use crate::models::{Crawled, ListingRecord, ReviewRecord, Scope};
use crate::scrapers::error::CrawlResult;
use crate::scrapers::extract::{FieldExtractor, REVIEW_BLOCK};
use crate::scrapers::scroll::{scroll_until_stable, ScrollOutcome};
use crate::scrapers::traits::{RenderingSession, Target};
use crate::scrapers::types::ReviewConfig;
use scraper::Html;
use tracing::{debug, info};

/// Visits each game's detail page and collects its user reviews
pub struct ReviewCrawler<'a> {
    config: &'a ReviewConfig,
    extractor: &'a FieldExtractor,
}

impl<'a> ReviewCrawler<'a> {
    pub fn new(config: &'a ReviewConfig, extractor: &'a FieldExtractor) -> Self {
        Self { config, extractor }
    }

    /// Crawl reviews for every listing that has a detail link.
    ///
    /// Anything that goes wrong for one game is recorded against that game
    /// and the crawl moves on to the next.
    pub fn crawl<S>(&self, session: &mut S, listings: &[ListingRecord]) -> Crawled<ReviewRecord>
    where
        S: RenderingSession + ?Sized,
    {
        let mut crawled = Crawled::default();

        for game in listings {
            let Some(link) = game.detail_link() else {
                debug!("No detail link for '{}'", game.title);
                continue;
            };

            match self.crawl_item(session, &game.title, link) {
                Ok(found) => {
                    info!("{} reviews for '{}'", found.records.len(), game.title);
                    crawled.extend(found);
                }
                Err(e) => crawled.warn(Scope::Item(game.title.clone()), e.to_string()),
            }
        }

        crawled
    }

    fn crawl_item<S>(&self, session: &mut S, title: &str, link: &str) -> CrawlResult<Crawled<ReviewRecord>>
    where
        S: RenderingSession + ?Sized,
    {
        info!("Extracting reviews from: {}", link);
        session.navigate(link)?;

        let tab = Target::LinkText(self.config.tab_text.clone());
        session.wait_until_clickable(&tab, self.config.tab_timeout)?;
        session.click(&tab)?;
        session.wait_until_present(&Target::Css(REVIEW_BLOCK.to_string()), self.config.tab_timeout)?;

        let mut crawled = Crawled::default();
        let outcome = scroll_until_stable(session, self.config.scroll_dwell, self.config.max_scrolls)?;
        match outcome {
            ScrollOutcome::Stable { height, scrolls } => {
                debug!("Height settled at {}px after {} scrolls", height, scrolls);
            }
            ScrollOutcome::Exhausted { height, scrolls } => crawled.warn(
                Scope::Item(title.to_string()),
                format!("height still changing after {scrolls} scrolls (last {height}px); keeping what loaded"),
            ),
        }

        let html = session.content()?;
        crawled.extend(self.parse_reviews(&html, title, link));
        Ok(crawled)
    }

    /// Extract up to the configured cap of review blocks from a detail page
    pub fn parse_reviews(&self, html: &str, title: &str, link: &str) -> Crawled<ReviewRecord> {
        let mut crawled = Crawled::default();
        let document = Html::parse_document(html);
        let blocks: Vec<_> = self.extractor.review_blocks(&document).collect();

        if blocks.is_empty() {
            crawled.warn(Scope::Item(title.to_string()), "no reviews found");
            return crawled;
        }
        if blocks.len() > self.config.max_reviews_per_item {
            debug!(
                "'{}' has {} reviews, keeping the first {}",
                title,
                blocks.len(),
                self.config.max_reviews_per_item
            );
        }

        crawled.records = blocks
            .into_iter()
            .take(self.config.max_reviews_per_item)
            .map(|block| self.extractor.review(block, title, link))
            .collect();
        crawled
    }
}
