use crate::models::{Crawled, ListingRecord, Scope};
use crate::scrapers::error::CrawlResult;
use crate::scrapers::extract::{parse_selector, FieldExtractor, LISTING_CONTAINER};
use crate::scrapers::traits::{RenderingSession, Target};
use crate::scrapers::types::ListingConfig;
use scraper::Html;
use tracing::{debug, info};

/// Walks the catalog's listing pages and collects one record per game card
pub struct ListingCrawler<'a> {
    config: &'a ListingConfig,
    extractor: &'a FieldExtractor,
}

impl<'a> ListingCrawler<'a> {
    pub fn new(config: &'a ListingConfig, extractor: &'a FieldExtractor) -> Self {
        Self { config, extractor }
    }

    /// Crawl pages `1..=pages` from the configuration
    pub fn crawl<S>(&self, session: &mut S) -> Crawled<ListingRecord>
    where
        S: RenderingSession + ?Sized,
    {
        self.crawl_pages(session, 1..=self.config.pages)
    }

    /// Crawl the given pages in order. A failing page is recorded and skipped.
    pub fn crawl_pages<S, I>(&self, session: &mut S, pages: I) -> Crawled<ListingRecord>
    where
        S: RenderingSession + ?Sized,
        I: IntoIterator<Item = u32>,
    {
        let mut crawled = Crawled::default();

        for page in pages {
            match self.crawl_page(session, page) {
                Ok(found) => {
                    info!("Page {}: {} games", page, found.records.len());
                    crawled.extend(found);
                }
                Err(e) => crawled.warn(Scope::Page(page), e.to_string()),
            }
        }

        crawled
    }

    fn crawl_page<S>(&self, session: &mut S, page: u32) -> CrawlResult<Crawled<ListingRecord>>
    where
        S: RenderingSession + ?Sized,
    {
        let url = self.config.page_url(page);
        info!("Processing: {}", url);
        session.navigate(&url)?;

        session.wait_until_present(
            &Target::Css(LISTING_CONTAINER.to_string()),
            self.config.container_timeout,
        )?;

        let html = session.content()?;
        self.parse_page(&html, page)
    }

    /// Extract the cards of the container that belongs to `page`
    pub fn parse_page(&self, html: &str, page: u32) -> CrawlResult<Crawled<ListingRecord>> {
        let mut crawled = Crawled::default();
        let document = Html::parse_document(html);
        let container_selector =
            parse_selector(&format!(r#"{LISTING_CONTAINER}[section="detailed|{page}"]"#))?;

        let Some(container) = document.select(&container_selector).next() else {
            crawled.warn(Scope::Page(page), "listing container not found");
            return Ok(crawled);
        };

        for (index, card) in self.extractor.cards(container).enumerate() {
            match self.extractor.listing(card) {
                Ok(record) => {
                    debug!("Card {}: {}", index, record.title);
                    crawled.records.push(record);
                }
                Err(e) => crawled.warn(Scope::Card { page, index }, e.to_string()),
            }
        }

        Ok(crawled)
    }
}
