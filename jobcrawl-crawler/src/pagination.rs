use crate::error::CrawlError;
use crate::model::PageSnapshot;
use crate::selector::compile;
use jobcrawl_config::{CrawlSettings, SiteConfig};
use jobcrawl_drivers::{BrowserSession, DriverError};
use scraper::Selector;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationOutcome {
    /// The next page was requested; carries its index.
    Advanced(u32),
    /// The site has no further pages.
    NoMorePages,
}

/// Moves the session to the next page of results.
pub struct PaginationController {
    next_css: String,
    next: Selector,
    settle: Duration,
}

impl PaginationController {
    pub fn new(next_css: impl Into<String>, settle: Duration) -> Result<Self, CrawlError> {
        let next_css = next_css.into();
        let next = compile("next page", &next_css)?;
        Ok(Self {
            next_css,
            next,
            settle,
        })
    }

    pub fn from_config(site: &SiteConfig, crawl: &CrawlSettings) -> Result<Self, CrawlError> {
        Self::new(site.next_page.clone(), crawl.pagination_settle())
    }

    /// Activate the "next" control if the snapshot has one.
    ///
    /// A missing control, or one that cannot be found or clicked in the live
    /// page, ends pagination normally. Only a dead session is an error.
    pub async fn advance(
        &self,
        session: &mut dyn BrowserSession,
        snapshot: &PageSnapshot,
    ) -> Result<PaginationOutcome, CrawlError> {
        let page = snapshot.page_index;
        if snapshot.count(&self.next) == 0 {
            info!(target: "crawl.paginate", page, "no next-page control; last page reached");
            return Ok(PaginationOutcome::NoMorePages);
        }

        match session.activate(&self.next_css).await {
            Ok(true) => {}
            Ok(false) => {
                info!(target: "crawl.paginate", page, "next-page control vanished before activation");
                return Ok(PaginationOutcome::NoMorePages);
            }
            Err(DriverError::Session(message)) => {
                return Err(CrawlError::Session {
                    page,
                    source: DriverError::Session(message),
                });
            }
            Err(error) => {
                warn!(target: "crawl.paginate", page, %error, "next-page control unusable");
                return Ok(PaginationOutcome::NoMorePages);
            }
        }

        // Activation swaps the listings asynchronously; the next render's
        // visibility wait confirms the new content.
        if !self.settle.is_zero() {
            sleep(self.settle).await;
        }

        let next = page + 1;
        debug!(target: "crawl.paginate", from = page, to = next, "advanced");
        Ok(PaginationOutcome::Advanced(next))
    }
}
