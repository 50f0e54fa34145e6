use crate::error::CrawlError;
use scraper::Selector;
use url::Url;

pub(crate) fn compile(name: &str, css: &str) -> Result<Selector, CrawlError> {
    Selector::parse(css)
        .map_err(|e| CrawlError::InvalidSite(format!("{name} selector `{css}`: {e}")))
}

pub(crate) fn parse_url(name: &str, raw: &str) -> Result<Url, CrawlError> {
    Url::parse(raw).map_err(|e| CrawlError::InvalidSite(format!("{name} `{raw}`: {e}")))
}
