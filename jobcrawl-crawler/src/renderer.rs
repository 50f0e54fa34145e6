use crate::error::CrawlError;
use crate::model::PageSnapshot;
use jobcrawl_config::{CrawlSettings, SiteConfig};
use jobcrawl_drivers::{BrowserSession, DriverError};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use url::Url;

/// What brings the next page into the session before it is snapshotted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderAction {
    /// Navigate to the crawl's entry point.
    LoadInitial(Url),
    /// The pagination control has already been activated; wait for the
    /// replacement content.
    AwaitPagination,
}

/// Turns a live session into a [`PageSnapshot`] once the listings are visible.
pub struct PageRenderer {
    ready_marker: String,
    timeout: Duration,
    settle: Duration,
}

impl PageRenderer {
    pub fn new(ready_marker: impl Into<String>, timeout: Duration, settle: Duration) -> Self {
        Self {
            ready_marker: ready_marker.into(),
            timeout,
            settle,
        }
    }

    pub fn from_config(site: &SiteConfig, crawl: &CrawlSettings) -> Self {
        Self::new(
            site.ready_marker.clone(),
            crawl.render_timeout(),
            crawl.render_settle(),
        )
    }

    pub async fn render(
        &self,
        session: &mut dyn BrowserSession,
        action: &RenderAction,
        page_index: u32,
    ) -> Result<PageSnapshot, CrawlError> {
        let session_error = |source: DriverError| CrawlError::Session {
            page: page_index,
            source,
        };

        if let RenderAction::LoadInitial(url) = action {
            session.navigate(url).await.map_err(session_error)?;
        }

        session
            .wait_for_visible(&self.ready_marker, self.timeout)
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    CrawlError::RenderTimeout {
                        page: page_index,
                        source,
                    }
                } else {
                    session_error(source)
                }
            })?;

        // The marker shows up before the site's scripts have finished laying
        // out every listing. A fixed pause is good enough for this site; it
        // does not prove the DOM is stable.
        if !self.settle.is_zero() {
            sleep(self.settle).await;
        }

        let html = session.page_source().await.map_err(session_error)?;
        debug!(
            target: "crawl.render",
            page = page_index,
            bytes = html.len(),
            "snapshot taken"
        );
        Ok(PageSnapshot::new(page_index, html))
    }
}
