//! Data models for scraped articles and the persisted archive.
//!
//! This module defines the core data structures used throughout the
//! application:
//! - [`Candidate`]: An article observed on the homepage, before dedup and
//!   enrichment
//! - [`ArticleRecord`]: The unit of persisted state, keyed by URL
//! - [`ArchiveState`]: The full retained history written to the cache file
//!
//! The archive serializes to JSON with snake_case field names. Optional
//! record fields carry `#[serde(default)]` so cache files written by older
//! versions (or with enrichment failures) load without error: unknown or
//! missing optional fields become absent, never a parse failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::fingerprint;

/// An article card extracted from the homepage.
///
/// Candidates exist only within a cycle. A candidate is only emitted when
/// both a qualifying story link and a non-empty title were found; author
/// and thumbnail degrade gracefully to absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute, normalized article URL. This is the dedup key.
    pub url: String,
    /// The article headline as displayed on the card.
    pub title: String,
    /// Display name from the author profile link, if the card carries one.
    pub author: Option<String>,
    /// Thumbnail image URL, if the card carries one.
    pub thumbnail: Option<String>,
    /// Last path segment of the article URL. Informational only.
    pub slug: String,
}

/// A fully ingested article as persisted in the archive.
///
/// # Invariants
///
/// - `url` is unique within an [`ArchiveState`].
/// - `fingerprint` is derived from `url` alone and never changes.
/// - `scraped_at` is set at first observation and never updated on
///   subsequent cycles.
/// - `description` may be absent (enrichment failed) without invalidating
///   the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Absolute article URL; unique key within the archive.
    pub url: String,
    /// The article headline.
    pub title: String,
    /// Author display name, when the homepage card linked a profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Thumbnail image URL, when the homepage card carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Last path segment of the URL.
    #[serde(default)]
    pub slug: String,
    /// Stable identifier: hex SHA-256 of `url`. Used as the feed entry guid.
    pub fingerprint: String,
    /// RFC 3339 UTC timestamp of first observation.
    pub scraped_at: String,
    /// Bounded-length description from enrichment, absent when the article
    /// fetch failed or yielded no usable text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ArticleRecord {
    /// Promote a homepage candidate to a persisted record.
    ///
    /// Assigns the URL fingerprint and stamps `scraped_at` with the moment
    /// of first observation.
    pub fn from_candidate(
        candidate: Candidate,
        description: Option<String>,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        let fingerprint = fingerprint(&candidate.url);
        Self {
            url: candidate.url,
            title: candidate.title,
            author: candidate.author,
            thumbnail: candidate.thumbnail,
            slug: candidate.slug,
            fingerprint,
            scraped_at: scraped_at.to_rfc3339(),
            description,
        }
    }
}

/// The persisted aggregate: every retained article plus the time of the
/// last mutating cycle.
///
/// Records are ordered oldest first. The length never exceeds the retention
/// bound; [`crate::store::merge`] evicts from the front when it would.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveState {
    /// Retained records, oldest first.
    #[serde(default)]
    pub articles: Vec<ArticleRecord>,
    /// RFC 3339 UTC timestamp of the last merge, or `null` before the first
    /// successful cycle.
    #[serde(default)]
    pub last_updated: Option<String>,
}
