#![allow(dead_code)]

use async_trait::async_trait;
use jobcrawl_common::observability::{LogConfig, init_logging};
use jobcrawl_config::JobcrawlConfig;
use jobcrawl_drivers::{BrowserSession, DriverError};
use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "jobcrawl-tests",
            log_dir: Some(std::env::temp_dir().join("jobcrawl-tests")),
            emit_stderr: true,
            default_filter: "debug".to_string(),
            ..LogConfig::default()
        };
        init_logging(config).unwrap_or_default()
    });
}

pub const START_URL: &str = "https://jobs.example.com/listados.html";

/// Default site selectors, example.com URLs, and no settle delays.
pub fn test_config(page_limit: u32) -> JobcrawlConfig {
    let mut config = JobcrawlConfig::default();
    config.site.start_url = START_URL.into();
    config.site.base_origin = "https://jobs.example.com".into();
    config.crawl.page_limit = page_limit;
    config.crawl.render_timeout_secs = 1;
    config.crawl.render_settle_ms = 0;
    config.crawl.pagination_settle_ms = 0;
    config
}

pub fn listing_html(page: usize, i: usize) -> String {
    format!(
        r#"<div class="sc-ktBuXk">
             <a class="sc-ertOQY" href="/empleos/p{page}-{i}.html"><h2>Job {page}-{i}</h2></a>
             <span class="sc-jiTwWT">Company {i}</span>
             <p>Detail {page}-{i}</p>
             <span class="sc-jFpLkX">Buenos Aires</span>
             <span class="sc-jFpLkX">Remoto</span>
           </div>"#
    )
}

pub fn page_html(page: usize, listings: usize, has_next: bool) -> String {
    let body: String = (0..listings).map(|i| listing_html(page, i)).collect();
    let next = if has_next {
        r##"<nav><a class="sc-LAuEU hXefkh" href="#">Siguiente</a></nav>"##
    } else {
        ""
    };
    format!("<html><body><main>{body}</main>{next}</body></html>")
}

/// How [`ScriptedSession::activate`] should misbehave on a given page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationFault {
    /// The live lookup finds nothing even though the snapshot had a control.
    Missing,
    /// The element is stale or not interactable.
    Element,
    /// The browser is gone.
    Session,
}

/// In-memory site: a list of pages, each rendered immediately, with a "next"
/// control on every page except the last.
pub struct ScriptedSession {
    pages: Vec<String>,
    has_next: Vec<bool>,
    current: Option<usize>,
    timeout_on: HashSet<u32>,
    activation_fault: Option<(u32, ActivationFault)>,
    pub navigations: Vec<Url>,
    /// 1-based pages on which the visibility wait succeeded.
    pub rendered: Vec<u32>,
    pub activations: u32,
    pub closed: bool,
}

impl ScriptedSession {
    pub fn with_listing_counts(counts: &[usize]) -> Self {
        let last = counts.len().saturating_sub(1);
        let has_next: Vec<bool> = (0..counts.len()).map(|i| i < last).collect();
        let pages = counts
            .iter()
            .enumerate()
            .map(|(i, n)| page_html(i + 1, *n, has_next[i]))
            .collect();
        Self::from_pages(pages, has_next)
    }

    pub fn from_pages(pages: Vec<String>, has_next: Vec<bool>) -> Self {
        Self {
            pages,
            has_next,
            current: None,
            timeout_on: HashSet::new(),
            activation_fault: None,
            navigations: Vec::new(),
            rendered: Vec::new(),
            activations: 0,
            closed: false,
        }
    }

    pub fn time_out_on(mut self, page: u32) -> Self {
        self.timeout_on.insert(page);
        self
    }

    pub fn fault_activation_on(mut self, page: u32, fault: ActivationFault) -> Self {
        self.activation_fault = Some((page, fault));
        self
    }

    /// Pretend the session is already showing `page` (1-based).
    pub fn at_page(mut self, page: u32) -> Self {
        self.current = Some(page as usize - 1);
        self
    }

    fn current_page(&self) -> Result<usize, DriverError> {
        self.current
            .ok_or_else(|| DriverError::Session("no document loaded".into()))
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&mut self, url: &Url) -> Result<(), DriverError> {
        self.navigations.push(url.clone());
        self.current = Some(0);
        Ok(())
    }

    async fn wait_for_visible(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        let page = self.current_page()? as u32 + 1;
        if self.timeout_on.contains(&page) {
            return Err(DriverError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            });
        }
        self.rendered.push(page);
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, DriverError> {
        let idx = self.current_page()?;
        Ok(self.pages[idx].clone())
    }

    async fn activate(&mut self, selector: &str) -> Result<bool, DriverError> {
        let idx = self.current_page()?;
        let page = idx as u32 + 1;
        match self.activation_fault {
            Some((p, ActivationFault::Missing)) if p == page => return Ok(false),
            Some((p, ActivationFault::Element)) if p == page => {
                return Err(DriverError::Element {
                    selector: selector.to_string(),
                    message: "stale element reference".into(),
                });
            }
            Some((p, ActivationFault::Session)) if p == page => {
                return Err(DriverError::Session("chrome not reachable".into()));
            }
            _ => {}
        }
        if !self.has_next[idx] {
            return Ok(false);
        }
        self.activations += 1;
        self.current = Some(idx + 1);
        Ok(true)
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.closed = true;
        Ok(())
    }
}
