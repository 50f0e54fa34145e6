use anyhow::Result;
use clap::Parser;
use cli::Cli;
use jobcrawl_common::observability::{LogConfig, init_logging};
use jobcrawl_config::JobcrawlConfig;
use jobcrawl_crawler::export::CsvExporter;
use jobcrawl_crawler::{CrawlOrchestrator, CrawlReport, CrawlStatus};
use jobcrawl_drivers::{BrowserSession, WebDriverSession};
use jobcrawl_runtime::{CancellationToken, CrawlRuntime};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};
mod cli;

fn main() -> Result<ExitCode> {
    // 1) Load config (CLI > env > file > defaults)
    let cli = Cli::parse();
    let cfg = cli.load_config()?;

    let log_path = init_logging(LogConfig {
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
        ..LogConfig::default()
    })?;
    info!(log = %log_path.display(), limit = cfg.crawl.page_limit, "starting crawl");

    // 2) Crawl on a single-threaded runtime; Ctrl-C stops at the next page.
    let runtime = CrawlRuntime::build("jobcrawl")?;
    let handle = runtime.handle();
    handle.install_ctrl_c();
    let outcome = runtime.block_on(crawl(&cfg, handle.cancellation()));
    runtime.shutdown(Duration::from_secs(1));
    let report = outcome?;

    // 3) Export whatever was collected, even from a failed run.
    if report.records.is_empty() {
        println!("No listings were extracted.");
    } else {
        let path = cfg.export.output_path(cfg.crawl.page_limit);
        CsvExporter::new(cfg.export.utf8_bom).write_file(&path, &report.records)?;
        println!(
            "Exported {} listings to '{}'",
            report.records.len(),
            path.display()
        );
    }

    println!(
        "Crawl {}: {} listings from {} pages ({} fragments skipped)",
        report.status,
        report.records.len(),
        report.pages_rendered,
        report.fragments_skipped
    );
    if let Some(error) = &report.error {
        eprintln!("error: {error}");
    }

    Ok(match report.status {
        CrawlStatus::Failed => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

async fn crawl(cfg: &JobcrawlConfig, cancel: CancellationToken) -> Result<CrawlReport> {
    let orchestrator = CrawlOrchestrator::from_config(cfg)?.with_cancellation(cancel);
    let mut session = WebDriverSession::connect(&cfg.browser, cfg.crawl.visibility_poll()).await?;

    let report = orchestrator.run(&mut session).await;

    if let Err(e) = session.close().await {
        warn!(error = %e, "failed to close browser session");
    }
    Ok(report)
}
