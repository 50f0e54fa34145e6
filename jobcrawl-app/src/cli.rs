use clap::Parser;
use jobcrawl_config::{ConfigError, JobcrawlConfig, JobcrawlConfigLoader};
use std::path::PathBuf;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "jobcrawl.yaml";

/// Crawl a paginated job board through a WebDriver browser and export the
/// listings as CSV.
#[derive(Debug, Parser)]
#[command(name = "jobcrawl", version)]
pub struct Cli {
    /// YAML configuration file (defaults to ./jobcrawl.yaml when present).
    #[arg(short, long, env = "JOBCRAWL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Stop after this many pages.
    #[arg(long)]
    pub page_limit: Option<u32>,

    /// Output CSV file; `{page_limit}` is replaced with the page limit.
    #[arg(short, long)]
    pub output: Option<String>,

    /// WebDriver endpoint, e.g. http://localhost:9515 for Chromedriver.
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Show the browser window instead of running headless.
    #[arg(long)]
    pub headed: bool,

    /// Mirror log events to stderr.
    #[arg(long)]
    pub log_stderr: bool,
}

impl Cli {
    /// Load file + env configuration, then apply command-line overrides.
    pub fn load_config(&self) -> Result<JobcrawlConfig, ConfigError> {
        let loader = match &self.config {
            Some(path) => JobcrawlConfigLoader::new().with_file(path),
            None => JobcrawlConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
        };
        let mut cfg = loader.load()?;
        self.apply_overrides(&mut cfg);
        Ok(cfg)
    }

    fn apply_overrides(&self, cfg: &mut JobcrawlConfig) {
        if let Some(limit) = self.page_limit {
            cfg.crawl.page_limit = limit;
        }
        if let Some(output) = &self.output {
            cfg.export.output = output.clone();
        }
        if let Some(url) = &self.webdriver_url {
            cfg.browser.webdriver_url = url.clone();
        }
        if self.headed {
            cfg.browser.headless = false;
        }
        if self.log_stderr {
            cfg.logging.emit_stderr = true;
        }
    }
}
