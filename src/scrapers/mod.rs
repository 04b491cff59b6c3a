pub mod browser;
pub mod error;
pub mod extract;
pub mod listing;
pub mod reviews;
pub mod scroll;
#[cfg(test)]
pub mod testing;
pub mod traits;
pub mod types;

pub use browser::ChromeSession;
pub use error::CrawlResult;
pub use extract::FieldExtractor;
pub use listing::ListingCrawler;
pub use reviews::ReviewCrawler;
pub use traits::RenderingSession;
pub use types::{BrowserConfig, ListingConfig, ReviewConfig};
