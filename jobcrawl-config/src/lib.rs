//! Loader for crawler configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults (every field has one, so an empty document is valid)
//! 2. YAML files / inline snippets, in the order they were attached
//! 3. `JOBCRAWL_`-prefixed environment variables, `__` separating sections
//!    (`JOBCRAWL_CRAWL__PAGE_LIMIT=3`)
//!
//! String values may reference `${VAR}` placeholders, which are expanded after
//! merging.
use config::{Config, Environment, File};
use jobcrawl_common::observability::LogFormat;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use config::ConfigError;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Marker replaced by the configured page limit in [`ExportConfig::output`].
pub const PAGE_LIMIT_PLACEHOLDER: &str = "{page_limit}";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobcrawlConfig {
    pub version: Option<String>,
    pub site: SiteConfig,
    pub crawl: CrawlSettings,
    pub browser: BrowserConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Where to start and how the listings site is structured.
///
/// Selector values are CSS selectors. The defaults describe the markup of
/// zonajobs.com.ar, whose class names are generated but stable.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub start_url: String,
    /// Origin that relative listing links are resolved against.
    pub base_origin: String,
    /// Element whose visibility means the listings have been rendered.
    pub ready_marker: String,
    pub listing: String,
    pub title: String,
    pub company: String,
    pub detail: String,
    /// Repeated element; first match is the location, second the work mode.
    pub facet: String,
    pub link: String,
    pub next_page: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            start_url: "https://www.zonajobs.com.ar/empleos-publicacion-menor-a-1-mes.html".into(),
            base_origin: "https://www.zonajobs.com.ar".into(),
            ready_marker: ".sc-ktBuXk".into(),
            listing: "div.sc-ktBuXk".into(),
            title: "h2".into(),
            company: ".sc-jiTwWT".into(),
            detail: "p".into(),
            facet: ".sc-jFpLkX".into(),
            link: "a.sc-ertOQY".into(),
            next_page: "a.sc-LAuEU.hXefkh".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    /// Highest page index that will be rendered and extracted.
    pub page_limit: u32,
    pub render_timeout_secs: u64,
    pub render_settle_ms: u64,
    pub pagination_settle_ms: u64,
    pub visibility_poll_ms: u64,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            page_limit: 500,
            render_timeout_secs: 20,
            render_settle_ms: 2_000,
            pagination_settle_ms: 3_000,
            visibility_poll_ms: 250,
        }
    }
}

impl CrawlSettings {
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn render_settle(&self) -> Duration {
        Duration::from_millis(self.render_settle_ms)
    }

    pub fn pagination_settle(&self) -> Duration {
        Duration::from_millis(self.pagination_settle_ms)
    }

    pub fn visibility_poll(&self) -> Duration {
        Duration::from_millis(self.visibility_poll_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub user_agent: String,
    /// Extra Chrome command-line switches appended after the built-in ones.
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output file name; `{page_limit}` is replaced with the crawl limit.
    pub output: String,
    /// Prefix the file with a UTF-8 byte order mark so spreadsheet tools
    /// detect the encoding.
    pub utf8_bom: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: "base_zonajobs_{page_limit}_paginas.csv".into(),
            utf8_bom: true,
        }
    }
}

impl ExportConfig {
    /// Resolve the output file name for a crawl capped at `page_limit` pages.
    ///
    /// ```
    /// use jobcrawl_config::ExportConfig;
    ///
    /// let export = ExportConfig::default();
    /// assert_eq!(
    ///     export.output_path(500).to_str(),
    ///     Some("base_zonajobs_500_paginas.csv")
    /// );
    /// ```
    pub fn output_path(&self, page_limit: u32) -> PathBuf {
        PathBuf::from(
            self.output
                .replace(PAGE_LIMIT_PLACEHOLDER, &page_limit.to_string()),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub dir: Option<PathBuf>,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            emit_stderr: false,
            dir: None,
            filter: "info".into(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct JobcrawlConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: String,
}

impl Default for JobcrawlConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl JobcrawlConfigLoader {
    /// Start with defaults only; `JOBCRAWL_` env overrides are applied on load.
    ///
    /// ```
    /// use jobcrawl_config::JobcrawlConfigLoader;
    ///
    /// let config = JobcrawlConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.crawl.page_limit, 500);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            env_prefix: jobcrawl_common::APP_NAME.to_uppercase(),
        }
    }

    /// Use a different environment prefix (tests use this to stay isolated).
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Attach a YAML/TOML/JSON file that must exist; the format is inferred
    /// from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use jobcrawl_config::JobcrawlConfigLoader;
    ///
    /// let cfg = JobcrawlConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// crawl:
    ///   page_limit: 3
    /// site:
    ///   base_origin: "https://jobs.example.com"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.crawl.page_limit, 3);
    /// assert_eq!(cfg.site.base_origin, "https://jobs.example.com");
    /// assert_eq!(cfg.site.title, "h2");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into typed config.
    ///
    /// ```
    /// use jobcrawl_config::JobcrawlConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOCTEST_WEBDRIVER_HOST", "grid.internal"); }
    ///
    /// let config = JobcrawlConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// browser:
    ///   webdriver_url: "http://${DOCTEST_WEBDRIVER_HOST}:4444"
    ///   headless: false
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.browser.webdriver_url, "http://grid.internal:4444");
    /// assert!(!config.browser.headless);
    ///
    /// unsafe { std::env::remove_var("DOCTEST_WEBDRIVER_HOST"); }
    /// ```
    pub fn load(self) -> Result<JobcrawlConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: JobcrawlConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
