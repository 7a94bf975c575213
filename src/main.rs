//! # Loksujag RSS
//!
//! Scrapes articles from [loksujag.com](https://loksujag.com) and
//! republishes the accumulated set as an RSS 2.0 feed.
//!
//! ## Features
//!
//! - Extracts article cards (link, title, author, thumbnail) from the
//!   homepage
//! - Enriches each unseen article with a bounded-length description,
//!   fetched one page at a time with a pacing delay
//! - Deduplicates against a persisted, size-bounded archive so re-runs are
//!   idempotent and feed entry identifiers stay stable
//! - Renders the most recent window of the archive into the feed, newest
//!   first
//!
//! ## Usage
//!
//! ```sh
//! loksujag_rss -c articles_cache.json -o loksujag_feed.xml
//! ```
//!
//! One invocation runs exactly one cycle and exits; schedule it externally
//! (cron, a systemd timer). Transient network trouble makes for a quieter
//! cycle rather than a failure; only a corrupt archive, a held lock, or an
//! unwritable output produces a non-zero exit.

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

mod cli;
mod error;
mod feed;
mod models;
mod pipeline;
mod scrapers;
mod store;
mod utils;

use cli::Cli;
use error::Error;
use pipeline::{CycleConfig, CycleReport};
use scrapers::SiteSource;
use store::{CycleLock, FileArchiveStore};

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    match run(args).await {
        Ok(report) => {
            info!(
                candidates = report.candidates,
                new_articles = report.new_articles,
                archived = report.archived,
                feed_entries = report.feed_entries,
                "Cycle complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Cycle failed");
            ExitCode::FAILURE
        }
    }
}

#[instrument(level = "info", skip_all, fields(base_url = %args.base_url))]
async fn run(args: Cli) -> Result<CycleReport, Error> {
    let start_time = std::time::Instant::now();
    info!("loksujag_rss starting up");

    let base = Url::parse(&args.base_url)?;
    let source = SiteSource::new(base, Duration::from_secs(args.timeout_secs))?;
    let archive = FileArchiveStore::new(&args.cache_file);
    let config = CycleConfig {
        retention: args.retention,
        window: args.window,
        pacing: Duration::from_millis(args.delay_ms),
    };

    // Held for the whole load→merge→save sequence so overlapping scheduler
    // invocations never interleave writes to the archive.
    let _lock = CycleLock::acquire(CycleLock::path_for(&args.cache_file))?;

    let (report, rss) = pipeline::run_cycle(&source, &archive, &config).await?;

    info!(path = %args.feed_file.display(), "Writing RSS feed");
    tokio::fs::write(&args.feed_file, &rss).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(report)
}
