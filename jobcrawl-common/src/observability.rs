//! Crawl logging: a daily rolling file under the app's data dir, optionally
//! mirrored to stderr.
//!
//! The binary and the integration tests both go through [`init_logging`]; only
//! the first call installs anything.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Overrides the platform data dir as the log location.
pub const LOG_DIR_ENV: &str = "JOBCRAWL_LOG_DIR";

/// `text` for people, `json` for log shippers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Where and how the crawler writes its log.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Names the log file (`<app_name>.log.<date>`) and the fallback directory.
    pub app_name: &'static str,
    /// Takes precedence over `JOBCRAWL_LOG_DIR`. A leading `~/` is expanded.
    pub log_dir: Option<PathBuf>,
    /// Mirror events to stderr, in the same format as the file.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Directive list such as `info,crawl.extract=debug`; `RUST_LOG` wins.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: crate::APP_NAME,
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

/// Install the process-wide subscriber and return today's log file.
///
/// The daily appender names files `<app_name>.log.YYYY-MM-DD`, so the returned
/// path is the one being written right now. A crawl that runs past midnight
/// continues in the next day's file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let file_prefix = format!("{}.log", config.app_name);
    let today_file = dir.join(format!("{file_prefix}.{}", Local::now().format("%Y-%m-%d")));

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &file_prefix));
    let _ = LOG_GUARD.set(guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let file_layer = match config.format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(false).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    };
    let stderr_layer = config.emit_stderr.then(|| match config.format {
        LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = LOG_PATH.set(today_file.clone());
    Ok(today_file)
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return expand_home(dir);
    }

    if let Ok(env_dir) = std::env::var(LOG_DIR_ENV) {
        return expand_home(Path::new(&env_dir));
    }

    dirs::data_local_dir()
        .map(|dir| dir.join(app_name).join("logs"))
        .unwrap_or_else(|| PathBuf::from(".").join(app_name))
}

fn expand_home(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins_and_home_is_expanded() {
        let explicit = resolve_log_dir("jobcrawl", Some(Path::new("/var/log/jobcrawl")));
        assert_eq!(explicit, PathBuf::from("/var/log/jobcrawl"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home(Path::new("~/crawl-logs")),
                home.join("crawl-logs")
            );
        }
        assert_eq!(expand_home(Path::new("logs/~x")), PathBuf::from("logs/~x"));
    }

    #[test]
    fn returned_path_is_todays_rolling_file() {
        let dir = std::env::temp_dir().join("jobcrawl-observability-test");
        let path = init_logging(LogConfig {
            app_name: "obs-test",
            log_dir: Some(dir.clone()),
            ..LogConfig::default()
        })
        .unwrap();

        let today = Local::now().format("%Y-%m-%d").to_string();
        assert_eq!(path, dir.join(format!("obs-test.log.{today}")));
        assert!(dir.is_dir());

        let again = init_logging(LogConfig::default()).unwrap();
        assert_eq!(again, path);
    }
}
