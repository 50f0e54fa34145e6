use jobcrawl_drivers::DriverError;
use thiserror::Error;

/// Errors that end a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The listings never became visible on this page.
    #[error("page {page} did not render: {source}")]
    RenderTimeout {
        page: u32,
        #[source]
        source: DriverError,
    },

    /// The browser session failed in a way the crawl cannot recover from.
    #[error("browser session failed on page {page}: {source}")]
    Session {
        page: u32,
        #[source]
        source: DriverError,
    },

    /// A selector or URL in the site configuration is unusable.
    #[error("invalid site configuration: {0}")]
    InvalidSite(String),
}

/// Why a single listing fragment was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FragmentExtractionError {
    #[error("fragment is nested inside another listing")]
    Nested,
    #[error("fragment has no resolvable fields")]
    Empty,
}
