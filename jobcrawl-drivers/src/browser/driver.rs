use crate::browser::{
    options::chrome_capabilities,
    session::{BrowserSession, DriverError},
};
use async_trait::async_trait;
use fantoccini::{
    error::{CmdError, ErrorStatus},
    Client, ClientBuilder, Locator,
};
use jobcrawl_config::BrowserConfig;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info};
use url::Url;

const ACTIVATE_SCRIPT: &str = "arguments[0].click();";

/// [`BrowserSession`] over a `fantoccini` WebDriver client.
pub struct WebDriverSession {
    client: Client,
    poll_interval: Duration,
}

impl WebDriverSession {
    /// Open a Chrome session on the WebDriver service at
    /// `config.webdriver_url` (Chromedriver listens on `http://localhost:9515`
    /// by default).
    ///
    /// `poll_interval` is how often visibility is re-checked while waiting.
    pub async fn connect(config: &BrowserConfig, poll_interval: Duration) -> Result<Self, DriverError> {
        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(config))
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| DriverError::Session(format!("connect to {}: {e}", config.webdriver_url)))?;

        info!(
            target: "browser.driver",
            webdriver = %config.webdriver_url,
            headless = config.headless,
            "browser session started"
        );

        Ok(Self {
            client,
            poll_interval,
        })
    }

    /// Returns `Ok(true)` once the first match is displayed, `Ok(false)` while
    /// it is missing or hidden.
    async fn probe_visible(&self, selector: &str) -> Result<bool, DriverError> {
        let element = match self.client.find(Locator::Css(selector)).await {
            Ok(element) => element,
            Err(e) => {
                return match classify(selector, e) {
                    DriverError::Element { .. } => Ok(false),
                    fatal => Err(fatal),
                }
            }
        };
        match element.is_displayed().await {
            Ok(displayed) => Ok(displayed),
            Err(e) => match classify(selector, e) {
                DriverError::Element { .. } => Ok(false),
                fatal => Err(fatal),
            },
        }
    }
}

/// Missing, stale or obstructed elements are recoverable. Every other status
/// (including `invalid session id` after a page crash) and every transport
/// failure means the session is gone.
fn classify(selector: &str, err: CmdError) -> DriverError {
    match &err {
        CmdError::Standard(w)
            if matches!(
                w.error,
                ErrorStatus::NoSuchElement
                    | ErrorStatus::StaleElementReference
                    | ErrorStatus::ElementNotInteractable
                    | ErrorStatus::ElementClickIntercepted
            ) =>
        {
            DriverError::Element {
                selector: selector.to_string(),
                message: err.to_string(),
            }
        }
        _ => DriverError::Session(err.to_string()),
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &Url) -> Result<(), DriverError> {
        debug!(target: "browser.driver", %url, "navigate");
        self.client
            .goto(url.as_str())
            .await
            .map_err(|e| DriverError::Session(format!("navigate to {url}: {e}")))
    }

    async fn wait_for_visible(
        &mut self,
        selector: &str,
        limit: Duration,
    ) -> Result<(), DriverError> {
        let poll = self.poll_interval;
        let waited = timeout(limit, async {
            loop {
                if self.probe_visible(selector).await? {
                    return Ok::<(), DriverError>(());
                }
                sleep(poll).await;
            }
        })
        .await;

        match waited {
            Ok(result) => result,
            Err(_) => Err(DriverError::Timeout {
                selector: selector.to_string(),
                waited: limit,
            }),
        }
    }

    async fn page_source(&mut self) -> Result<String, DriverError> {
        self.client
            .source()
            .await
            .map_err(|e| DriverError::Session(format!("read page source: {e}")))
    }

    async fn activate(&mut self, selector: &str) -> Result<bool, DriverError> {
        let elements = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| classify(selector, e))?;
        let Some(first) = elements.into_iter().next() else {
            return Ok(false);
        };

        let arg = serde_json::to_value(&first).map_err(|e| DriverError::Element {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;
        self.client
            .execute(ACTIVATE_SCRIPT, vec![arg])
            .await
            .map_err(|e| classify(selector, e))?;
        Ok(true)
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| DriverError::Session(format!("close session: {e}")))?;
        info!(target: "browser.driver", "browser session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantoccini::error::WebDriver;

    fn standard(status: ErrorStatus) -> CmdError {
        CmdError::Standard(WebDriver::new(status, "reported by driver"))
    }

    #[test]
    fn element_statuses_are_recoverable() {
        for status in [
            ErrorStatus::NoSuchElement,
            ErrorStatus::StaleElementReference,
            ErrorStatus::ElementNotInteractable,
            ErrorStatus::ElementClickIntercepted,
        ] {
            match classify("a.next", standard(status)) {
                DriverError::Element { selector, message } => {
                    assert_eq!(selector, "a.next");
                    assert!(message.contains("reported by driver"));
                }
                other => panic!("expected element error, got {other:?}"),
            }
        }
    }

    #[test]
    fn crashed_session_is_fatal() {
        let err = classify(
            "a.next",
            CmdError::Standard(WebDriver::new(
                ErrorStatus::InvalidSessionId,
                "session deleted because of page crash",
            )),
        );
        assert!(matches!(err, DriverError::Session(ref m) if m.contains("page crash")));
    }

    #[test]
    fn other_driver_statuses_are_fatal() {
        for status in [
            ErrorStatus::UnknownError,
            ErrorStatus::NoSuchWindow,
            ErrorStatus::JavascriptError,
            ErrorStatus::SessionNotCreated,
        ] {
            assert!(matches!(
                classify(".sc-ktBuXk", standard(status)),
                DriverError::Session(_)
            ));
        }
    }

    #[test]
    fn protocol_failures_are_fatal() {
        let err = classify(".sc-ktBuXk", CmdError::NotJson("<html>502</html>".into()));
        assert!(matches!(err, DriverError::Session(_)));
        assert!(matches!(
            classify(".sc-ktBuXk", CmdError::WaitTimeout),
            DriverError::Session(_)
        ));
    }
}
