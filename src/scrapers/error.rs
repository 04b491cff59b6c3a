use std::time::Duration;
use thiserror::Error;

/// Failures raised while driving the browser or writing output
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A bounded wait expired before the element showed up
    #[error("timed out after {timeout:?} waiting for {target}")]
    NavigationTimeout { target: String, timeout: Duration },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("interaction failed: {0}")]
    Interaction(String),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("invalid CSS selector: {0}")]
    Selector(String),

    #[error("unresolvable link: {0}")]
    Link(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CrawlResult<T> = Result<T, CrawlError>;
