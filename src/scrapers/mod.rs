//! Scraping for the loksujag.com homepage and article pages.
//!
//! Extraction follows a consistent two-phase pattern:
//!
//! 1. **Fetching**: Download the page over HTTP with a fixed per-request
//!    timeout
//! 2. **Extraction**: Reduce the parsed document to structured values with
//!    a pure function
//!
//! | Page | Module | Produces |
//! |------|--------|----------|
//! | Homepage | [`homepage`] | Candidate articles from card containers |
//! | Article | [`article`] | A bounded-length description |
//!
//! [`SiteSource`] ties the two together behind the
//! [`ArticleSource`](crate::pipeline::ArticleSource) seam the orchestrator
//! is injected with. Failure handling differs by phase: a homepage failure
//! yields zero candidates for the cycle, an article failure surfaces as a
//! typed transport error so the caller can keep the record without a
//! description.

pub mod article;
pub mod homepage;

use crate::error::Error;
use crate::models::Candidate;
use crate::pipeline::ArticleSource;
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// HTTP-backed article source for the live site.
pub struct SiteSource {
    client: Client,
    base: Url,
}

impl SiteSource {
    /// Build a source against a site origin with a per-request timeout.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// GET a page, treating a non-success status as a transport error.
    async fn fetch(&self, url: &str) -> Result<String, Error> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[async_trait]
impl ArticleSource for SiteSource {
    #[instrument(level = "info", skip(self), fields(source = %self.base))]
    async fn homepage_candidates(&self) -> Vec<Candidate> {
        match self.fetch(self.base.as_str()).await {
            Ok(body) => {
                let document = Html::parse_document(&body);
                let candidates = homepage::extract_candidates(&document, &self.base);
                info!(count = candidates.len(), "Indexed homepage candidates");
                candidates
            }
            Err(e) => {
                warn!(error = %e, "Homepage fetch failed; continuing with no candidates");
                Vec::new()
            }
        }
    }

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn enrich(&self, url: &str) -> Result<Option<String>, Error> {
        let body = self.fetch(url).await?;
        let description = article::extract_description(&Html::parse_document(&body));
        debug!(found = description.is_some(), "Extracted article description");
        Ok(description)
    }
}
