//! Crawl loop for paginated, script-rendered job listings.
//!
//! Each iteration renders a page, extracts its listings, and advances the
//! pagination control until the site runs out of pages, the page limit is
//! reached, the crawl is cancelled, or the browser fails.
//!
//! - [`renderer::PageRenderer`]: waits for the listings to render and snapshots the DOM
//! - [`extractor::ListingExtractor`]: maps listing fragments to [`model::JobRecord`]s
//! - [`pagination::PaginationController`]: activates the "next page" control
//! - [`orchestrator::CrawlOrchestrator`]: the state machine tying them together
//! - [`export::CsvExporter`]: writes the accumulated records as CSV

pub mod error;
pub mod export;
pub mod extractor;
pub mod model;
pub mod orchestrator;
pub mod pagination;
pub mod renderer;
mod selector;

pub use error::{CrawlError, FragmentExtractionError};
pub use model::{JobRecord, NOT_AVAILABLE, PageSnapshot};
pub use orchestrator::{CrawlOrchestrator, CrawlReport, CrawlStatus};
