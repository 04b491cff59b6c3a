use crate::scrapers::error::{CrawlError, CrawlResult};
use crate::scrapers::traits::RenderingSession;
use serde_json::Value;
use std::thread;
use std::time::Duration;
use tracing::debug;

pub const PAGE_HEIGHT_SCRIPT: &str = "document.body.scrollHeight";
pub const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollState {
    Scrolling { last_height: u64 },
    Stable { height: u64 },
}

/// How a scroll-until-stable run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// A scroll step left the content height unchanged
    Stable { height: u64, scrolls: usize },
    /// The step bound was hit while the height was still changing
    Exhausted { height: u64, scrolls: usize },
}

/// Scroll to the bottom until the content height stops changing.
///
/// Each step scrolls, sleeps for `dwell` and re-measures. At most
/// `max_scrolls` steps are taken.
pub fn scroll_until_stable<S>(session: &mut S, dwell: Duration, max_scrolls: usize) -> CrawlResult<ScrollOutcome>
where
    S: RenderingSession + ?Sized,
{
    let mut state = ScrollState::Scrolling {
        last_height: measure_height(session)?,
    };
    let mut scrolls = 0;

    loop {
        state = match state {
            ScrollState::Stable { height } => return Ok(ScrollOutcome::Stable { height, scrolls }),
            ScrollState::Scrolling { last_height } if scrolls >= max_scrolls => {
                return Ok(ScrollOutcome::Exhausted {
                    height: last_height,
                    scrolls,
                })
            }
            ScrollState::Scrolling { last_height } => {
                session.execute_script(SCROLL_TO_BOTTOM_SCRIPT)?;
                scrolls += 1;
                if !dwell.is_zero() {
                    thread::sleep(dwell);
                }

                let height = measure_height(session)?;
                debug!("Scroll {}: height {} -> {}", scrolls, last_height, height);
                if height == last_height {
                    ScrollState::Stable { height }
                } else {
                    ScrollState::Scrolling { last_height: height }
                }
            }
        };
    }
}

fn measure_height<S>(session: &mut S) -> CrawlResult<u64>
where
    S: RenderingSession + ?Sized,
{
    let value = session.execute_script(PAGE_HEIGHT_SCRIPT)?;
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .ok_or_else(|| CrawlError::Script(format!("negative page height {n}"))),
        other => Err(CrawlError::Script(format!("page height is not a number: {other:?}"))),
    }
}
