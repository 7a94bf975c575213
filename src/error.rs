//! Error taxonomy for the scrape-and-republish pipeline.
//!
//! The variants map onto the recovery policy applied at each stage:
//!
//! - [`Error::Transport`] is recovered locally. A homepage-level failure
//!   yields an empty candidate list for the cycle; an article-level failure
//!   yields a record without a description.
//! - [`Error::StorageCorrupt`] is fatal. A cache file that exists but cannot
//!   be parsed must never be silently replaced with an empty archive.
//! - [`Error::InvalidTimestamp`] skips the offending record from the feed;
//!   the rest of the render continues.
//! - [`Error::LockHeld`] aborts the cycle so two invocations never interleave
//!   writes to the archive file.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A network fetch failed: timeout, connection failure, or a non-success
    /// HTTP status.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The persisted archive exists but could not be deserialized.
    #[error("archive file {path} is corrupt: {source}")]
    StorageCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A stored record carries a `scraped_at` value that cannot be parsed.
    #[error("record {url} has unparseable scraped_at {value:?}")]
    InvalidTimestamp { url: String, value: String },

    /// Another invocation holds the cycle lock.
    #[error("lock file {path} already exists; is another cycle running?")]
    LockHeld { path: PathBuf },

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
