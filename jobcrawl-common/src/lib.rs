//! Shared plumbing for the jobcrawl workspace.
//!
//! Kept deliberately small so that every crate can depend on it:
//!
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`APP_NAME`]: logical application name used for log files and env prefixes
//!
//! # Examples
//!
//! ```rust
//! use jobcrawl_common::observability::{LogConfig, LogFormat};
//!
//! let cfg = LogConfig {
//!     format: LogFormat::Json,
//!     ..LogConfig::default()
//! };
//! assert_eq!(cfg.app_name, jobcrawl_common::APP_NAME);
//! ```

pub mod observability;

/// Name used for log files, data directories and the config env prefix.
pub const APP_NAME: &str = "jobcrawl";
