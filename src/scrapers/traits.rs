use crate::scrapers::error::CrawlResult;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// How an element on the rendered page is located
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// CSS selector
    Css(String),
    /// Anchor whose visible text matches exactly
    LinkText(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Css(selector) => write!(f, "'{selector}'"),
            Target::LinkText(text) => write!(f, "link '{text}'"),
        }
    }
}

/// A rendered browser session driven one navigation at a time.
///
/// Both crawlers borrow the session mutably; it is never shared.
pub trait RenderingSession {
    fn navigate(&mut self, url: &str) -> CrawlResult<()>;

    /// Block until `target` is present in the DOM or `timeout` expires
    fn wait_until_present(&mut self, target: &Target, timeout: Duration) -> CrawlResult<()>;

    /// Block until `target` is rendered and can receive a click
    fn wait_until_clickable(&mut self, target: &Target, timeout: Duration) -> CrawlResult<()>;

    fn click(&mut self, target: &Target) -> CrawlResult<()>;

    /// Evaluate `script` in the page and return its scalar result, if any
    fn execute_script(&mut self, script: &str) -> CrawlResult<Option<Value>>;

    /// Serialized markup of the current rendered document
    fn content(&mut self) -> CrawlResult<String>;

    /// Release the browser. Calling it twice is a no-op.
    fn close(&mut self) -> CrawlResult<()>;
}
