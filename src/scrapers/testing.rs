//! Scripted session used by the crawler tests in place of Chrome.

use crate::scrapers::error::{CrawlError, CrawlResult};
use crate::scrapers::extract::{normalized_text, parse_selector};
use crate::scrapers::scroll::{PAGE_HEIGHT_SCRIPT, SCROLL_TO_BOTTOM_SCRIPT};
use crate::scrapers::traits::{RenderingSession, Target};
use scraper::Html;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct FakeSession {
    pages: HashMap<String, String>,
    broken_urls: HashSet<String>,
    heights: VecDeque<Value>,
    last_height: Option<Value>,
    current: Option<String>,
    pub navigations: Vec<String>,
    pub clicks: Vec<Target>,
    pub scrolls: usize,
    pub closed: bool,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Navigating to `url` fails outright
    pub fn with_broken_url(mut self, url: &str) -> Self {
        self.broken_urls.insert(url.to_string());
        self
    }

    /// Successive `scrollHeight` reads; the last value repeats once drained
    pub fn with_heights(mut self, heights: &[u64]) -> Self {
        self.heights.extend(heights.iter().map(|h| Value::from(*h)));
        self
    }

    pub fn with_height_value(mut self, value: Value) -> Self {
        self.heights.push_back(value);
        self
    }

    fn find(&self, target: &Target) -> bool {
        let Some(html) = &self.current else {
            return false;
        };
        let document = Html::parse_document(html);
        match target {
            Target::Css(css) => parse_selector(css)
                .map(|selector| document.select(&selector).next().is_some())
                .unwrap_or(false),
            Target::LinkText(text) => parse_selector("a")
                .map(|selector| document.select(&selector).any(|a| normalized_text(a) == *text))
                .unwrap_or(false),
        }
    }
}

impl RenderingSession for FakeSession {
    fn navigate(&mut self, url: &str) -> CrawlResult<()> {
        self.navigations.push(url.to_string());
        if self.broken_urls.contains(url) {
            self.current = None;
            return Err(CrawlError::Navigation(format!("{url}: connection refused")));
        }
        self.current = self.pages.get(url).cloned();
        Ok(())
    }

    fn wait_until_present(&mut self, target: &Target, timeout: Duration) -> CrawlResult<()> {
        if self.find(target) {
            Ok(())
        } else {
            Err(CrawlError::NavigationTimeout {
                target: target.to_string(),
                timeout,
            })
        }
    }

    fn wait_until_clickable(&mut self, target: &Target, timeout: Duration) -> CrawlResult<()> {
        self.wait_until_present(target, timeout)
    }

    fn click(&mut self, target: &Target) -> CrawlResult<()> {
        if !self.find(target) {
            return Err(CrawlError::Interaction(format!("{target} not found")));
        }
        self.clicks.push(target.clone());
        Ok(())
    }

    fn execute_script(&mut self, script: &str) -> CrawlResult<Option<Value>> {
        match script {
            PAGE_HEIGHT_SCRIPT => {
                let height = self
                    .heights
                    .pop_front()
                    .or_else(|| self.last_height.clone())
                    .unwrap_or_else(|| Value::from(0));
                self.last_height = Some(height.clone());
                Ok(Some(height))
            }
            SCROLL_TO_BOTTOM_SCRIPT => {
                self.scrolls += 1;
                Ok(None)
            }
            other => Err(CrawlError::Script(format!("unexpected script: {other}"))),
        }
    }

    fn content(&mut self) -> CrawlResult<String> {
        Ok(self.current.clone().unwrap_or_default())
    }

    fn close(&mut self) -> CrawlResult<()> {
        self.closed = true;
        Ok(())
    }
}
