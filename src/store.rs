//! Persistent, deduplicated, size-bounded archive of article records.
//!
//! The archive is the only durable state the system owns: a JSON file
//! holding `{articles: [...], last_updated: ...}`. This module provides:
//!
//! - [`ArchiveStore`]: the load/save seam the orchestrator is injected
//!   with, so tests can substitute an in-memory store
//! - [`FileArchiveStore`]: the production implementation; writes go to a
//!   sibling temp file first and are renamed into place, so readers never
//!   observe a partially written archive
//! - [`diff_new`] / [`merge`]: the pure dedup and retention logic
//! - [`CycleLock`]: a lock file guarding the load→merge→save sequence
//!   against overlapping invocations
//!
//! A cache file that exists but cannot be parsed is a
//! [`Error::StorageCorrupt`] surfaced to the operator; the file is left
//! untouched rather than overwritten with an empty archive.

use crate::error::Error;
use crate::models::{ArchiveState, ArticleRecord, Candidate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Default retention bound for the full archive.
pub const DEFAULT_RETENTION: usize = 100;

/// Load/save seam over the persisted archive.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Deserialize the persisted state, or the empty default when no
    /// archive exists yet.
    async fn load(&self) -> Result<ArchiveState, Error>;

    /// Durably persist the full state, atomically from a reader's
    /// perspective.
    async fn save(&self, state: &ArchiveState) -> Result<(), Error>;
}

/// JSON-file-backed archive store.
pub struct FileArchiveStore {
    path: PathBuf,
}

impl FileArchiveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut os = self.path.clone().into_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }
}

#[async_trait]
impl ArchiveStore for FileArchiveStore {
    #[instrument(level = "info", skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<ArchiveState, Error> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No archive file yet; starting from empty state");
                return Ok(ArchiveState::default());
            }
            Err(e) => return Err(e.into()),
        };
        let state: ArchiveState =
            serde_json::from_slice(&bytes).map_err(|source| Error::StorageCorrupt {
                path: self.path.clone(),
                source,
            })?;
        info!(articles = state.articles.len(), "Loaded archive");
        Ok(state)
    }

    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn save(&self, state: &ArchiveState) -> Result<(), Error> {
        let json = serde_json::to_vec_pretty(state).map_err(|e| {
            // Serializing our own in-memory state can only fail on I/O-ish
            // grounds; surface it as such.
            std::io::Error::new(ErrorKind::Other, e)
        })?;
        let temp = self.temp_path();
        fs::write(&temp, &json).await?;
        fs::rename(&temp, &self.path).await?;
        info!(articles = state.articles.len(), "Persisted archive");
        Ok(())
    }
}

/// Return the candidates not already present in the archive.
///
/// Membership is exact string equality on the normalized URL. Relative
/// order of `candidates` is preserved. A URL repeated within `candidates`
/// (the homepage sometimes features the same story in two cards) is kept
/// only at its first occurrence, so one cycle can never introduce a
/// duplicate into the archive.
pub fn diff_new(candidates: Vec<Candidate>, state: &ArchiveState) -> Vec<Candidate> {
    let mut seen: HashSet<String> = state.articles.iter().map(|a| a.url.clone()).collect();
    let unseen: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| seen.insert(c.url.clone()))
        .collect();
    debug!(unseen = unseen.len(), "Computed unseen candidates");
    unseen
}

/// Append new records and enforce the retention bound.
///
/// Records are appended in the order given, then the sequence is trimmed
/// from the front so its length never exceeds `retention` (FIFO eviction of
/// the oldest records). `last_updated` is stamped with `now`. Pure with
/// respect to its inputs; persisting the result is the caller's explicit
/// next step.
pub fn merge(
    mut state: ArchiveState,
    new_records: Vec<ArticleRecord>,
    retention: usize,
    now: DateTime<Utc>,
) -> ArchiveState {
    state.articles.extend(new_records);
    if state.articles.len() > retention {
        let excess = state.articles.len() - retention;
        state.articles.drain(..excess);
    }
    state.last_updated = Some(now.to_rfc3339());
    state
}

/// Mutual-exclusion guard for one ingestion cycle.
///
/// Created with `O_EXCL` semantics; a second invocation finding the file
/// already present fails its cycle instead of racing the first writer. The
/// file is removed on drop. A lock left behind by a crashed run must be
/// removed by the operator; the error message names the path.
pub struct CycleLock {
    path: PathBuf,
}

impl CycleLock {
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(_) => {
                debug!(path = %path.display(), "Acquired cycle lock");
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::LockHeld { path }),
            Err(e) => Err(e.into()),
        }
    }

    /// Lock path for a given archive file.
    pub fn path_for(archive: &Path) -> PathBuf {
        let mut os = archive.to_path_buf().into_os_string();
        os.push(".lock");
        PathBuf::from(os)
    }
}

impl Drop for CycleLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate(url: &str) -> Candidate {
        Candidate {
            url: url.to_string(),
            title: format!("Title for {url}"),
            author: None,
            thumbnail: None,
            slug: url.rsplit('/').next().unwrap_or_default().to_string(),
        }
    }

    fn record(url: &str) -> ArticleRecord {
        ArticleRecord::from_candidate(candidate(url), None, Utc::now())
    }

    fn state_with(urls: &[&str]) -> ArchiveState {
        ArchiveState {
            articles: urls.iter().map(|u| record(u)).collect(),
            last_updated: None,
        }
    }

    #[test]
    fn test_diff_new_filters_known_urls_and_keeps_order() {
        let state = state_with(&["https://loksujag.com/story/a"]);
        let unseen = diff_new(
            vec![
                candidate("https://loksujag.com/story/a"),
                candidate("https://loksujag.com/story/b"),
                candidate("https://loksujag.com/story/c"),
            ],
            &state,
        );
        let urls: Vec<&str> = unseen.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            ["https://loksujag.com/story/b", "https://loksujag.com/story/c"]
        );
    }

    #[test]
    fn test_diff_new_drops_repeats_within_one_homepage() {
        let unseen = diff_new(
            vec![
                candidate("https://loksujag.com/story/a"),
                candidate("https://loksujag.com/story/a"),
            ],
            &ArchiveState::default(),
        );
        assert_eq!(unseen.len(), 1);
    }

    #[test]
    fn test_merge_appends_in_order_and_stamps_last_updated() {
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();
        let merged = merge(
            state_with(&["https://loksujag.com/story/a"]),
            vec![
                record("https://loksujag.com/story/b"),
                record("https://loksujag.com/story/c"),
            ],
            DEFAULT_RETENTION,
            now,
        );
        let urls: Vec<&str> = merged.articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://loksujag.com/story/a",
                "https://loksujag.com/story/b",
                "https://loksujag.com/story/c",
            ]
        );
        assert_eq!(merged.last_updated, Some(now.to_rfc3339()));
    }

    #[test]
    fn test_merge_evicts_oldest_beyond_retention() {
        let mut state = ArchiveState::default();
        for i in 0..5 {
            state = merge(
                state,
                vec![record(&format!("https://loksujag.com/story/{i}"))],
                3,
                Utc::now(),
            );
            assert!(state.articles.len() <= 3);
        }
        let urls: Vec<&str> = state.articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://loksujag.com/story/2",
                "https://loksujag.com/story/3",
                "https://loksujag.com/story/4",
            ]
        );
    }

    #[test]
    fn test_merge_at_exact_bound_replaces_oldest() {
        let state = state_with(&[
            "https://loksujag.com/story/old",
            "https://loksujag.com/story/mid",
        ]);
        let merged = merge(
            state,
            vec![record("https://loksujag.com/story/new")],
            2,
            Utc::now(),
        );
        let urls: Vec<&str> = merged.articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            ["https://loksujag.com/story/mid", "https://loksujag.com/story/new"]
        );
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileArchiveStore::new(dir.path().join("cache.json"));
        let state = merge(
            state_with(&["https://loksujag.com/story/a", "https://loksujag.com/story/b"]),
            Vec::new(),
            DEFAULT_RETENTION,
            Utc::now(),
        );
        store.save(&state).await.unwrap();
        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded, state);
    }

    #[tokio::test]
    async fn test_load_missing_file_yields_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileArchiveStore::new(dir.path().join("absent.json"));
        let state = store.load().await.unwrap();
        assert!(state.articles.is_empty());
        assert_eq!(state.last_updated, None);
    }

    #[tokio::test]
    async fn test_load_corrupt_file_fails_and_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, b"{not json at all").unwrap();
        let store = FileArchiveStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, Error::StorageCorrupt { .. }));
        assert_eq!(std::fs::read(&path).unwrap(), b"{not json at all");
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let store = FileArchiveStore::new(&path);
        store.save(&ArchiveState::default()).await.unwrap();
        assert!(path.exists());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_cycle_lock_excludes_second_holder() {
        let dir = tempfile::tempdir().unwrap();
        let lock_path = CycleLock::path_for(&dir.path().join("cache.json"));
        let lock = CycleLock::acquire(&lock_path).unwrap();
        assert!(matches!(
            CycleLock::acquire(&lock_path),
            Err(Error::LockHeld { .. })
        ));
        drop(lock);
        CycleLock::acquire(&lock_path).unwrap();
    }
}
