use crate::scrapers::error::{CrawlError, CrawlResult};
use crate::scrapers::traits::{RenderingSession, Target};
use crate::scrapers::types::BrowserConfig;
use headless_chrome::util::Wait;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Rendering session backed by a single headless Chrome tab
pub struct ChromeSession {
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
}

impl ChromeSession {
    /// Launch Chrome and open the tab every navigation goes through
    pub fn launch(config: &BrowserConfig) -> CrawlResult<Self> {
        info!(
            "Launching {} Chrome...",
            if config.headless { "headless" } else { "headed" }
        );

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .window_size(Some(config.window_size))
            .path(config.chrome_path.clone())
            .idle_browser_timeout(config.idle_timeout)
            .args(vec![OsStr::new("--disable-gpu"), OsStr::new("--start-maximized")])
            .build()
            .map_err(|e| CrawlError::Browser(format!("failed to build launch options: {e}")))?;

        let browser =
            Browser::new(options).map_err(|e| CrawlError::Browser(format!("failed to launch Chrome: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| CrawlError::Browser(format!("failed to open tab: {e}")))?;

        Ok(Self {
            browser: Some(browser),
            tab: Some(tab),
        })
    }

    fn tab(&self) -> CrawlResult<&Arc<Tab>> {
        self.tab
            .as_ref()
            .ok_or_else(|| CrawlError::Browser("session already closed".to_string()))
    }

    fn find<'t>(tab: &'t Tab, target: &Target) -> anyhow::Result<Element<'t>> {
        match target {
            Target::Css(selector) => tab.find_element(selector),
            Target::LinkText(text) => tab.find_element_by_xpath(&link_text_xpath(text)),
        }
    }
}

/// XPath for an anchor whose whitespace-normalized text equals `text`
fn link_text_xpath(text: &str) -> String {
    if text.contains('\'') {
        format!("//a[normalize-space(.)=\"{text}\"]")
    } else {
        format!("//a[normalize-space(.)='{text}']")
    }
}

impl RenderingSession for ChromeSession {
    fn navigate(&mut self, url: &str) -> CrawlResult<()> {
        let tab = self.tab()?;
        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| CrawlError::Navigation(format!("{url}: {e}")))?;
        Ok(())
    }

    fn wait_until_present(&mut self, target: &Target, timeout: Duration) -> CrawlResult<()> {
        let tab = self.tab()?;
        let found = match target {
            Target::Css(selector) => tab.wait_for_element_with_custom_timeout(selector, timeout),
            Target::LinkText(text) => tab.wait_for_xpath_with_custom_timeout(&link_text_xpath(text), timeout),
        };
        found.map(|_| ()).map_err(|e| {
            debug!("Wait for {} failed: {}", target, e);
            CrawlError::NavigationTimeout {
                target: target.to_string(),
                timeout,
            }
        })
    }

    fn wait_until_clickable(&mut self, target: &Target, timeout: Duration) -> CrawlResult<()> {
        let tab = self.tab()?;
        // Clickable once the element is attached and has a layout box.
        Wait::with_timeout(timeout)
            .until(|| {
                let element = Self::find(tab, target).ok()?;
                element.get_box_model().ok().map(|_| ())
            })
            .map_err(|_| CrawlError::NavigationTimeout {
                target: format!("{target} to become clickable"),
                timeout,
            })
    }

    fn click(&mut self, target: &Target) -> CrawlResult<()> {
        let tab = self.tab()?;
        let element = Self::find(tab, target).map_err(|e| CrawlError::Interaction(format!("{target}: {e}")))?;
        element
            .click()
            .map_err(|e| CrawlError::Interaction(format!("click on {target}: {e}")))?;
        Ok(())
    }

    fn execute_script(&mut self, script: &str) -> CrawlResult<Option<Value>> {
        let tab = self.tab()?;
        let result = tab
            .evaluate(script, false)
            .map_err(|e| CrawlError::Script(e.to_string()))?;
        Ok(result.value)
    }

    fn content(&mut self) -> CrawlResult<String> {
        match self.execute_script("document.documentElement.outerHTML")? {
            Some(Value::String(html)) => {
                debug!("Captured {} bytes of HTML", html.len());
                Ok(html)
            }
            other => Err(CrawlError::Script(format!("page markup unavailable: {other:?}"))),
        }
    }

    fn close(&mut self) -> CrawlResult<()> {
        let closed = match self.tab.take() {
            Some(tab) => tab
                .close(true)
                .map(|_| ())
                .map_err(|e| CrawlError::Browser(format!("failed to close tab: {e}"))),
            None => Ok(()),
        };
        // Dropping the browser terminates the Chrome process.
        if self.browser.take().is_some() {
            info!("Browser closed");
        }
        closed
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Error while releasing browser: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_xpath_quotes_text() {
        assert_eq!(link_text_xpath("User Reviews"), "//a[normalize-space(.)='User Reviews']");
        assert_eq!(link_text_xpath("Critic's Picks"), "//a[normalize-space(.)=\"Critic's Picks\"]");
    }
}
