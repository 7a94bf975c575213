//! Utility functions for fingerprinting and string manipulation.
//!
//! This module provides helper functions used throughout the application:
//! - Content-addressed URL fingerprints for stable feed entry identifiers
//! - Character-aware truncation for description bounding
//! - String truncation for logging

use sha2::{Digest, Sha256};

/// Derive the stable identifier for an article URL.
///
/// The fingerprint is the lowercase hex SHA-256 digest of the exact URL byte
/// sequence. It is a pure function of the URL: recomputing it for the same
/// URL always yields the same value, across calls and across process
/// restarts, which is what makes feed entry identifiers stable between runs.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(fingerprint("https://loksujag.com/story/example"),
///            fingerprint("https://loksujag.com/story/example"));
/// ```
pub fn fingerprint(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Truncate a string to at most `max` characters.
///
/// The bound is measured in characters, not bytes, so multi-byte scripts
/// (the site publishes primarily in Urdu) are never cut mid-codepoint.
/// The cut takes no notice of word boundaries; that matches the site's
/// historical feed output.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of characters to keep
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated with an ellipsis and byte count indicator
/// appended. Only used for log previews of titles and payloads; never for
/// feed content.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head = truncate_chars(s, max);
        let rest = s.len() - head.len();
        format!("{}…(+{} bytes)", head, rest)
    }
}
