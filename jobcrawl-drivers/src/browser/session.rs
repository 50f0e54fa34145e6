use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Failures reported by a [`BrowserSession`].
#[derive(Debug, Error)]
pub enum DriverError {
    /// The element never became visible within the allotted time.
    #[error("timed out after {waited:?} waiting for `{selector}` to become visible")]
    Timeout { selector: String, waited: Duration },

    /// A lookup or interaction on a specific element failed (stale, detached,
    /// not interactable). The session itself is still usable.
    #[error("element `{selector}` unavailable: {message}")]
    Element { selector: String, message: String },

    /// The underlying browser session is unusable.
    #[error("browser session error: {0}")]
    Session(String),
}

impl DriverError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }
}

/// Operations the crawler needs from a live, rendering browser.
///
/// One session is driven by one crawl at a time; callers hold it by `&mut`.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url` in the current tab.
    async fn navigate(&mut self, url: &Url) -> Result<(), DriverError>;

    /// Block until an element matching `selector` is displayed, or fail with
    /// [`DriverError::Timeout`] once `timeout` has elapsed.
    async fn wait_for_visible(&mut self, selector: &str, timeout: Duration)
        -> Result<(), DriverError>;

    /// Serialized DOM of the current document.
    async fn page_source(&mut self) -> Result<String, DriverError>;

    /// Activate the first element matching `selector` through script, which is
    /// not affected by overlays the way a pointer click is.
    ///
    /// Returns `Ok(false)` when nothing matches.
    async fn activate(&mut self, selector: &str) -> Result<bool, DriverError>;

    /// End the session. Further calls are invalid.
    async fn close(&mut self) -> Result<(), DriverError>;
}
