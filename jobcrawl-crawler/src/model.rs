use scraper::{Html, Selector};
use serde::Serialize;

/// Placeholder stored in a [`JobRecord`] field that could not be resolved.
pub const NOT_AVAILABLE: &str = "N/A";

/// One job listing as it appeared on the site.
///
/// Serializes with the export column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    #[serde(rename = "Titulo")]
    pub title: String,
    #[serde(rename = "Empresa")]
    pub company: String,
    #[serde(rename = "Detalle")]
    pub detail: String,
    #[serde(rename = "Ubicacion")]
    pub location: String,
    #[serde(rename = "Modo de Trabajo")]
    pub work_mode: String,
    /// Absolute URL of the listing, or [`NOT_AVAILABLE`].
    #[serde(rename = "Enlace")]
    pub link: String,
}

/// Serialized DOM of one rendered page.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    /// 1-based position in the crawl.
    pub page_index: u32,
    pub html: String,
}

impl PageSnapshot {
    pub fn new(page_index: u32, html: String) -> Self {
        Self { page_index, html }
    }

    /// Parse the snapshot into a queryable document.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }

    /// Number of elements matching `selector`.
    pub fn count(&self, selector: &Selector) -> usize {
        self.document().select(selector).count()
    }
}
