//! The crawl loop as an explicit state machine.
//!
//! ```text
//! Init -> Loading -> Ready -> Extracting -> Paginating -> Loading ...
//!            |         |          |              |
//!            v         v          v              v
//!         Done/Failed Done       Done       Done/Failed
//! ```
//!
//! `Loading` refuses to render a page past the limit, so with a limit of N at
//! most N pages are ever rendered. `Ready` is where external cancellation is
//! observed.
use crate::error::CrawlError;
use crate::extractor::ListingExtractor;
use crate::model::{JobRecord, PageSnapshot};
use crate::pagination::{PaginationController, PaginationOutcome};
use crate::renderer::{PageRenderer, RenderAction};
use crate::selector::parse_url;
use jobcrawl_config::JobcrawlConfig;
use jobcrawl_drivers::BrowserSession;
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use url::Url;

/// How a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    /// The site ran out of listings or pages.
    Completed,
    /// The configured page limit stopped the crawl.
    LimitReached,
    /// The cancellation token fired between pages.
    Cancelled,
    /// Rendering or the browser session failed; records are partial.
    Failed,
}

impl CrawlStatus {
    /// Whether the crawl stopped on its own terms rather than on an error.
    pub fn is_success(self) -> bool {
        !matches!(self, CrawlStatus::Failed)
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CrawlStatus::Completed => "completed",
            CrawlStatus::LimitReached => "limit reached",
            CrawlStatus::Cancelled => "cancelled",
            CrawlStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
enum CrawlState {
    Init,
    Loading(RenderAction),
    Ready(PageSnapshot),
    Extracting(PageSnapshot),
    Paginating(PageSnapshot),
    Done(CrawlStatus),
    Failed(CrawlError),
}

impl CrawlState {
    fn name(&self) -> &'static str {
        match self {
            CrawlState::Init => "init",
            CrawlState::Loading(_) => "loading",
            CrawlState::Ready(_) => "ready",
            CrawlState::Extracting(_) => "extracting",
            CrawlState::Paginating(_) => "paginating",
            CrawlState::Done(_) => "done",
            CrawlState::Failed(_) => "failed",
        }
    }
}

/// Mutable progress of one crawl. Only the orchestrator touches it.
#[derive(Debug)]
struct CrawlSession {
    page_index: u32,
    page_limit: u32,
    records: Vec<JobRecord>,
    pages_rendered: u32,
    fragments_skipped: usize,
}

impl CrawlSession {
    fn new(page_limit: u32) -> Self {
        Self {
            page_index: 1,
            page_limit,
            records: Vec::new(),
            pages_rendered: 0,
            fragments_skipped: 0,
        }
    }

    fn limit_exceeded(&self) -> bool {
        self.page_index > self.page_limit
    }

    fn finish(self, status: CrawlStatus, error: Option<CrawlError>) -> CrawlReport {
        CrawlReport {
            records: self.records,
            status,
            error,
            pages_rendered: self.pages_rendered,
            fragments_skipped: self.fragments_skipped,
        }
    }
}

/// Everything a crawl produced, including partial results of a failed run.
#[derive(Debug)]
pub struct CrawlReport {
    /// Records in encounter order: page order, then position on the page.
    pub records: Vec<JobRecord>,
    pub status: CrawlStatus,
    /// Set when `status` is [`CrawlStatus::Failed`].
    pub error: Option<CrawlError>,
    pub pages_rendered: u32,
    pub fragments_skipped: usize,
}

pub struct CrawlOrchestrator {
    start_url: Url,
    page_limit: u32,
    renderer: PageRenderer,
    extractor: ListingExtractor,
    pagination: PaginationController,
    cancel: Option<CancellationToken>,
}

impl CrawlOrchestrator {
    pub fn new(
        start_url: Url,
        page_limit: u32,
        renderer: PageRenderer,
        extractor: ListingExtractor,
        pagination: PaginationController,
    ) -> Self {
        Self {
            start_url,
            page_limit,
            renderer,
            extractor,
            pagination,
            cancel: None,
        }
    }

    /// Build every component from the loaded configuration.
    pub fn from_config(config: &JobcrawlConfig) -> Result<Self, CrawlError> {
        Ok(Self::new(
            parse_url("start url", &config.site.start_url)?,
            config.crawl.page_limit,
            PageRenderer::from_config(&config.site, &config.crawl),
            ListingExtractor::from_config(&config.site)?,
            PaginationController::from_config(&config.site, &config.crawl)?,
        ))
    }

    /// Stop at the next page boundary once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Crawl until the site, the page limit, cancellation, or an error ends it.
    ///
    /// Never fails outright: records gathered before a failure are returned
    /// with [`CrawlStatus::Failed`], so check `status` before trusting them as
    /// complete.
    pub async fn run(&self, session: &mut dyn BrowserSession) -> CrawlReport {
        let mut crawl = CrawlSession::new(self.page_limit);
        let mut state = CrawlState::Init;

        loop {
            state = match state {
                CrawlState::Init => {
                    CrawlState::Loading(RenderAction::LoadInitial(self.start_url.clone()))
                }
                CrawlState::Loading(action) => {
                    if crawl.limit_exceeded() {
                        info!(
                            target: "crawl.orchestrator",
                            limit = crawl.page_limit,
                            "page limit reached; stopping"
                        );
                        CrawlState::Done(CrawlStatus::LimitReached)
                    } else {
                        info!(
                            target: "crawl.orchestrator",
                            page = crawl.page_index,
                            limit = crawl.page_limit,
                            "crawling page"
                        );
                        match self.renderer.render(session, &action, crawl.page_index).await {
                            Ok(snapshot) => {
                                crawl.pages_rendered += 1;
                                CrawlState::Ready(snapshot)
                            }
                            Err(e) => CrawlState::Failed(e),
                        }
                    }
                }
                CrawlState::Ready(snapshot) => {
                    if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                        info!(
                            target: "crawl.orchestrator",
                            page = snapshot.page_index,
                            "cancellation requested; stopping"
                        );
                        CrawlState::Done(CrawlStatus::Cancelled)
                    } else {
                        CrawlState::Extracting(snapshot)
                    }
                }
                CrawlState::Extracting(snapshot) => {
                    let page = self.extractor.extract(&snapshot);
                    crawl.fragments_skipped += page.failures.len();
                    if page.fragments_found == 0 {
                        info!(
                            target: "crawl.orchestrator",
                            page = snapshot.page_index,
                            "no more listings found"
                        );
                        CrawlState::Done(CrawlStatus::Completed)
                    } else {
                        info!(
                            target: "crawl.orchestrator",
                            page = snapshot.page_index,
                            listings = page.fragments_found,
                            extracted = page.records.len(),
                            total = crawl.records.len() + page.records.len(),
                            "page extracted"
                        );
                        crawl.records.extend(page.records);
                        CrawlState::Paginating(snapshot)
                    }
                }
                CrawlState::Paginating(snapshot) => {
                    match self.pagination.advance(session, &snapshot).await {
                        Ok(PaginationOutcome::Advanced(next)) => {
                            crawl.page_index = next;
                            CrawlState::Loading(RenderAction::AwaitPagination)
                        }
                        Ok(PaginationOutcome::NoMorePages) => CrawlState::Done(CrawlStatus::Completed),
                        Err(e) => CrawlState::Failed(e),
                    }
                }
                CrawlState::Done(status) => {
                    info!(
                        target: "crawl.orchestrator",
                        %status,
                        records = crawl.records.len(),
                        pages = crawl.pages_rendered,
                        "crawl finished"
                    );
                    return crawl.finish(status, None);
                }
                CrawlState::Failed(e) => {
                    error!(
                        target: "crawl.orchestrator",
                        error = %e,
                        records = crawl.records.len(),
                        "crawl aborted; keeping partial results"
                    );
                    return crawl.finish(CrawlStatus::Failed, Some(e));
                }
            };
            debug!(target: "crawl.orchestrator", state = state.name(), "transition");
        }
    }
}
