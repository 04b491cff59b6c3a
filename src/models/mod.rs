use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder written for any field missing from the markup
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for reviews posted without a visible username
pub const ANONYMOUS: &str = "Anonymous";

/// One game card from a catalog listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Release Date")]
    pub release_date: String,
    #[serde(rename = "Rating")]
    pub rating: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Metascore")]
    pub metascore: String,
    #[serde(rename = "Link")]
    pub link: String,
}

impl ListingRecord {
    /// The detail page URL, or `None` when the card carried no link
    pub fn detail_link(&self) -> Option<&str> {
        if self.link == NOT_AVAILABLE {
            None
        } else {
            Some(&self.link)
        }
    }
}

/// One user review from a game's detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRecord {
    #[serde(rename = "Game")]
    pub game: String,
    #[serde(rename = "User")]
    pub user: String,
    #[serde(rename = "Score")]
    pub score: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "Link")]
    pub link: String,
}

/// Where in the crawl a record was dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Scope {
    Page(u32),
    Item(String),
    Card { page: u32, index: usize },
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Page(page) => write!(f, "page {page}"),
            Scope::Item(title) => write!(f, "item '{title}'"),
            Scope::Card { page, index } => write!(f, "card {index} on page {page}"),
        }
    }
}

/// A skipped page, item or card, kept for the run summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub scope: Scope,
    pub reason: String,
}

impl Warning {
    pub fn new(scope: Scope, reason: impl Into<String>) -> Self {
        Self {
            scope,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scope, self.reason)
    }
}

/// Records produced by a crawl phase together with everything it skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crawled<T> {
    pub records: Vec<T>,
    pub warnings: Vec<Warning>,
}

impl<T> Default for Crawled<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<T> Crawled<T> {
    /// Record a warning and log it
    pub fn warn(&mut self, scope: Scope, reason: impl Into<String>) {
        let warning = Warning::new(scope, reason);
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, other: Crawled<T>) {
        self.records.extend(other.records);
        self.warnings.extend(other.warnings);
    }
}
