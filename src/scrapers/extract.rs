//! Field extraction from rendered catalog and review markup.
//!
//! Every field is looked up by a fixed selector inside its card or review
//! block. A missing element degrades that field to its placeholder; it never
//! drops the record.

use crate::models::{ListingRecord, ReviewRecord, ANONYMOUS, NOT_AVAILABLE};
use crate::scrapers::error::{CrawlError, CrawlResult};
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub const LISTING_CONTAINER: &str = "div.c-productListings";
pub const REVIEW_BLOCK: &str = "div.c-siteReview_main";

/// Parse a CSS selector, reporting the offending selector on failure
pub fn parse_selector(selector: &str) -> CrawlResult<Selector> {
    Selector::parse(selector).map_err(|e| CrawlError::Selector(format!("'{selector}': {e}")))
}

struct CardSelectors {
    card: Selector,
    title: Selector,
    release_date: Selector,
    rating_anchor: Selector,
    description: Selector,
    metascore: Selector,
    link: Selector,
}

struct ReviewSelectors {
    block: Selector,
    user: Selector,
    score: Selector,
    date: Selector,
    content: Selector,
}

/// Maps catalog cards and review blocks to records
pub struct FieldExtractor {
    cards: CardSelectors,
    reviews: ReviewSelectors,
    site_origin: Url,
}

impl FieldExtractor {
    /// `site_origin` is the base that relative card links are resolved against
    pub fn new(site_origin: &str) -> CrawlResult<Self> {
        let site_origin = Url::parse(site_origin)
            .map_err(|e| CrawlError::Link(format!("site origin '{site_origin}': {e}")))?;

        Ok(Self {
            cards: CardSelectors {
                card: parse_selector("div.c-finderProductCard")?,
                title: parse_selector("div.c-finderProductCard_title")?,
                release_date: parse_selector("span.u-text-uppercase")?,
                rating_anchor: parse_selector("span.u-text-capitalize")?,
                description: parse_selector("div.c-finderProductCard_description")?,
                metascore: parse_selector("div.c-siteReviewScore")?,
                link: parse_selector("a[href]")?,
            },
            reviews: ReviewSelectors {
                block: parse_selector(REVIEW_BLOCK)?,
                user: parse_selector("a.c-siteReviewHeader_username")?,
                score: parse_selector("div.c-siteReviewScore")?,
                date: parse_selector("div.c-siteReviewHeader_reviewDate")?,
                content: parse_selector("div.c-siteReview_quote")?,
            },
            site_origin,
        })
    }

    /// Item cards inside a listing container, in document order
    pub fn cards<'a>(&'a self, container: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        container.select(&self.cards.card)
    }

    /// Review blocks anywhere in the document, in document order
    pub fn review_blocks<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        document.select(&self.reviews.block)
    }

    /// Build a listing record from one card.
    ///
    /// Fails only when the card carries an `href` that cannot be resolved
    /// into a URL; a card without any link gets `N/A`.
    pub fn listing(&self, card: ElementRef<'_>) -> CrawlResult<ListingRecord> {
        let selectors = &self.cards;

        let link = match card
            .select(&selectors.link)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
        {
            Some(href) => self
                .site_origin
                .join(href.trim())
                .map_err(|e| CrawlError::Link(format!("'{href}': {e}")))?
                .to_string(),
            None => NOT_AVAILABLE.to_string(),
        };

        Ok(ListingRecord {
            title: field(card, &selectors.title),
            release_date: field(card, &selectors.release_date),
            rating: following_text(card, &selectors.rating_anchor)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            description: field(card, &selectors.description),
            metascore: field(card, &selectors.metascore),
            link,
        })
    }

    /// Build a review record from one review block of `game`'s detail page
    pub fn review(&self, block: ElementRef<'_>, game: &str, link: &str) -> ReviewRecord {
        let selectors = &self.reviews;
        ReviewRecord {
            game: game.to_string(),
            user: first_text(block, &selectors.user).unwrap_or_else(|| ANONYMOUS.to_string()),
            score: field(block, &selectors.score),
            date: field(block, &selectors.date),
            content: field(block, &selectors.content),
            link: link.to_string(),
        }
    }
}

/// Text of every descendant text node, each trimmed, joined without separator
pub fn normalized_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Normalized text of the first match, if any
fn first_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector).next().map(normalized_text)
}

fn field(root: ElementRef<'_>, selector: &Selector) -> String {
    first_text(root, selector).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// First non-blank text node that follows the first match as a sibling.
///
/// Element siblings in between are skipped; only the anchor's own siblings
/// are considered, never its children.
fn following_text(root: ElementRef<'_>, anchor: &Selector) -> Option<String> {
    let anchor = root.select(anchor).next()?;
    anchor
        .next_siblings()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .find(|text| !text.is_empty())
        .map(str::to_string)
}
