//! Listing extraction from a rendered page.
//!
//! Every fragment is handled on its own: a missing sub-element only blanks the
//! corresponding field, and a malformed fragment is skipped without affecting
//! its siblings.
use crate::error::{CrawlError, FragmentExtractionError};
use crate::model::{JobRecord, NOT_AVAILABLE, PageSnapshot};
use crate::selector::{compile, parse_url};
use jobcrawl_config::SiteConfig;
use scraper::{ElementRef, Selector};
use tracing::{debug, warn};
use url::Url;

/// A fragment that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentFailure {
    /// 0-based position of the fragment on its page.
    pub position: usize,
    pub error: FragmentExtractionError,
}

/// Result of extracting one page.
///
/// `records.len() + failures.len() == fragments_found`, and `records` keeps
/// page order.
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    pub fragments_found: usize,
    pub records: Vec<JobRecord>,
    pub failures: Vec<FragmentFailure>,
}

pub struct ListingExtractor {
    base_origin: Url,
    listing: Selector,
    title: Selector,
    company: Selector,
    detail: Selector,
    facet: Selector,
    link: Selector,
}

impl ListingExtractor {
    pub fn from_config(site: &SiteConfig) -> Result<Self, CrawlError> {
        Ok(Self {
            base_origin: parse_url("base origin", &site.base_origin)?,
            listing: compile("listing", &site.listing)?,
            title: compile("title", &site.title)?,
            company: compile("company", &site.company)?,
            detail: compile("detail", &site.detail)?,
            facet: compile("facet", &site.facet)?,
            link: compile("link", &site.link)?,
        })
    }

    /// Extract every listing fragment on the page.
    ///
    /// An empty `records` list with no fragments found is how the end of the
    /// data is recognised.
    pub fn extract(&self, snapshot: &PageSnapshot) -> ExtractedPage {
        let document = snapshot.document();
        let mut page = ExtractedPage::default();

        for (position, fragment) in document.select(&self.listing).enumerate() {
            page.fragments_found += 1;
            match self.extract_fragment(fragment) {
                Ok(record) => page.records.push(record),
                Err(error) => {
                    warn!(
                        target: "crawl.extract",
                        page = snapshot.page_index,
                        position,
                        %error,
                        "skipping listing fragment"
                    );
                    page.failures.push(FragmentFailure { position, error });
                }
            }
        }

        debug!(
            target: "crawl.extract",
            page = snapshot.page_index,
            found = page.fragments_found,
            extracted = page.records.len(),
            skipped = page.failures.len(),
            "page extracted"
        );
        page
    }

    fn extract_fragment(&self, fragment: ElementRef<'_>) -> Result<JobRecord, FragmentExtractionError> {
        if self.is_nested(fragment) {
            return Err(FragmentExtractionError::Nested);
        }

        let title = first_text(fragment, &self.title);
        let company = first_text(fragment, &self.company);
        let detail = first_text(fragment, &self.detail);
        let facets: Vec<ElementRef<'_>> = fragment.select(&self.facet).collect();
        let location = facets.first().and_then(|el| text_of(*el));
        let work_mode = facets.get(1).and_then(|el| text_of(*el));
        let link = self.resolve_link(fragment);

        let fields = [title, company, detail, location, work_mode, link];
        if fields.iter().all(Option::is_none) {
            return Err(FragmentExtractionError::Empty);
        }

        let [title, company, detail, location, work_mode, link] = fields.map(or_sentinel);
        Ok(JobRecord {
            title,
            company,
            detail,
            location,
            work_mode,
            link,
        })
    }

    /// A listing inside another listing would duplicate its parent's content.
    fn is_nested(&self, fragment: ElementRef<'_>) -> bool {
        fragment
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| self.listing.matches(&ancestor))
    }

    fn resolve_link(&self, fragment: ElementRef<'_>) -> Option<String> {
        let href = fragment
            .select(&self.link)
            .next()?
            .value()
            .attr("href")?
            .trim();
        if href.is_empty() {
            return None;
        }
        self.base_origin.join(href).ok().map(String::from)
    }
}

fn first_text(fragment: ElementRef<'_>, selector: &Selector) -> Option<String> {
    fragment.select(selector).next().and_then(text_of)
}

fn text_of(element: ElementRef<'_>) -> Option<String> {
    let text: String = element.text().collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn or_sentinel(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
