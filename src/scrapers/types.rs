use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str =
    "https://www.metacritic.com/browse/game/?releaseYearMin=1958&releaseYearMax=2025&page={}";
pub const DEFAULT_SITE_ORIGIN: &str = "https://www.metacritic.com";

/// Catalog traversal parameters
#[derive(Debug, Clone, Serialize)]
pub struct ListingConfig {
    /// Page URL template; `{}` is replaced by the page number
    pub base_url: String,
    /// Origin that relative card links are resolved against
    pub site_origin: String,
    /// Pages 1..=pages are visited
    pub pages: u32,
    /// Bounded wait for the listing container
    pub container_timeout: Duration,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            pages: 50,
            container_timeout: Duration::from_secs(20),
        }
    }
}

impl ListingConfig {
    pub fn page_url(&self, page: u32) -> String {
        self.base_url.replace("{}", &page.to_string())
    }
}

/// Detail page parameters
#[derive(Debug, Clone, Serialize)]
pub struct ReviewConfig {
    /// Visible text of the tab that reveals user reviews
    pub tab_text: String,
    /// Bounded wait for the tab and for the first review block
    pub tab_timeout: Duration,
    /// Pause after each scroll so lazily loaded reviews can attach
    pub scroll_dwell: Duration,
    /// Upper bound on scroll steps for pages that never settle
    pub max_scrolls: usize,
    pub max_reviews_per_item: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            tab_text: "User Reviews".to_string(),
            tab_timeout: Duration::from_secs(15),
            scroll_dwell: Duration::from_secs(2),
            max_scrolls: 200,
            max_reviews_per_item: 1000,
        }
    }
}

/// Chrome launch parameters
#[derive(Debug, Clone, Serialize)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Chrome binary; auto-detected when unset
    pub chrome_path: Option<PathBuf>,
    pub window_size: (u32, u32),
    /// How long Chrome may sit idle between commands before it is torn down
    pub idle_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            window_size: (1920, 1080),
            idle_timeout: Duration::from_secs(300),
        }
    }
}
