//! One ingestion cycle: extract → diff → enrich → merge → render.
//!
//! The orchestrator owns the sequencing policy the site is owed: article
//! pages are fetched strictly one at a time with a fixed pacing delay
//! between fetches. That delay is deliberate backpressure toward the
//! origin server, configured here rather than buried in the enricher, so
//! tests can set it to zero without mocking time.
//!
//! Both collaborators are injected: [`ArticleSource`] for the site and
//! [`ArchiveStore`](crate::store::ArchiveStore) for the persisted archive,
//! so the whole cycle runs against in-memory fakes in tests. Cycles carry
//! no in-memory state between invocations; all continuity lives in the
//! archive file.

use crate::error::Error;
use crate::feed::{self, FeedDocument};
use crate::models::{ArticleRecord, Candidate};
use crate::store::{self, ArchiveStore};
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Where candidates and descriptions come from.
///
/// The production implementation is
/// [`SiteSource`](crate::scrapers::SiteSource); tests substitute fakes.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Current homepage candidates. A homepage-level failure is absorbed
    /// here: the cycle proceeds with an empty list.
    async fn homepage_candidates(&self) -> Vec<Candidate>;

    /// Fetch one article page and derive a description. `Ok(None)` means
    /// the page had no usable description; `Err` means the fetch itself
    /// failed. Callers keep the record either way.
    async fn enrich(&self, url: &str) -> Result<Option<String>, Error>;
}

/// Orchestrator-owned knobs for one cycle.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// Retention bound on the full archive.
    pub retention: usize,
    /// Number of most recent records rendered into the feed.
    pub window: usize,
    /// Delay between consecutive article fetches.
    pub pacing: Duration,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            retention: store::DEFAULT_RETENTION,
            window: feed::DEFAULT_WINDOW,
            pacing: Duration::from_secs(1),
        }
    }
}

/// What one cycle did, for logging and exit reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub candidates: usize,
    pub new_articles: usize,
    pub archived: usize,
    pub feed_entries: usize,
}

/// Run one full cycle and return the report plus the serialized RSS bytes.
///
/// Fails only on unrecoverable archive problems (corrupt cache, failed
/// save); network trouble shows up as a quieter cycle instead.
#[instrument(level = "info", skip_all)]
pub async fn run_cycle(
    source: &dyn ArticleSource,
    archive: &dyn ArchiveStore,
    config: &CycleConfig,
) -> Result<(CycleReport, Vec<u8>), Error> {
    let mut state = archive.load().await?;

    info!("Checking for new articles");
    let candidates = source.homepage_candidates().await;
    let unseen = store::diff_new(candidates.clone(), &state);
    info!(
        candidates = candidates.len(),
        unseen = unseen.len(),
        "Compared homepage against archive"
    );

    let mut new_records: Vec<ArticleRecord> = Vec::with_capacity(unseen.len());
    let unseen_count = unseen.len();
    for (i, candidate) in unseen.into_iter().enumerate() {
        info!(
            title = %truncate_for_log(&candidate.title, 50),
            "Scraping content for article"
        );
        let description = match source.enrich(&candidate.url).await {
            Ok(description) => description,
            Err(e) => {
                warn!(
                    url = %candidate.url,
                    error = %e,
                    "Enrichment failed; keeping record without description"
                );
                None
            }
        };
        new_records.push(ArticleRecord::from_candidate(candidate, description, Utc::now()));
        if i + 1 < unseen_count {
            tokio::time::sleep(config.pacing).await;
        }
    }

    if new_records.is_empty() {
        info!("No new articles found");
    } else {
        info!(count = new_records.len(), "Merging new articles into archive");
        state = store::merge(state, new_records, config.retention, Utc::now());
        archive.save(&state).await?;
    }

    // The feed is regenerated every cycle, new articles or not.
    let document: FeedDocument = feed::render(&state, config.window);
    let rss = feed::write_rss(&document)?;

    Ok((
        CycleReport {
            candidates: candidates.len(),
            new_articles: unseen_count,
            archived: state.articles.len(),
            feed_entries: document.entries.len(),
        },
        rss,
    ))
}
