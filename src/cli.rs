//! Command-line interface definitions for the feed generator.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! A plain invocation runs exactly one full cycle with the defaults; every
//! knob can also be tuned via a flag or environment variable.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the loksujag RSS feed generator.
///
/// # Examples
///
/// ```sh
/// # One cycle with the defaults
/// loksujag_rss
///
/// # Custom cache and output locations
/// loksujag_rss -c /var/lib/loksujag/cache.json -o /srv/www/feed.xml
///
/// # Faster pacing for a mirror that allows it
/// loksujag_rss --delay-ms 250
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the persisted article archive
    #[arg(short, long, default_value = "articles_cache.json")]
    pub cache_file: PathBuf,

    /// Path the RSS document is written to
    #[arg(short = 'o', long, default_value = "loksujag_feed.xml")]
    pub feed_file: PathBuf,

    /// Origin of the site to scrape
    #[arg(long, env = "LOKSUJAG_BASE_URL", default_value = "https://loksujag.com")]
    pub base_url: String,

    /// Maximum number of records kept in the archive
    #[arg(long, default_value_t = 100)]
    pub retention: usize,

    /// Number of most recent records rendered into the feed
    #[arg(long, default_value_t = 50)]
    pub window: usize,

    /// Delay between consecutive article fetches, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Per-request network timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["loksujag_rss"]);
        assert_eq!(cli.cache_file, PathBuf::from("articles_cache.json"));
        assert_eq!(cli.feed_file, PathBuf::from("loksujag_feed.xml"));
        assert_eq!(cli.retention, 100);
        assert_eq!(cli.window, 50);
        assert_eq!(cli.delay_ms, 1000);
        assert_eq!(cli.timeout_secs, 30);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "loksujag_rss",
            "-c",
            "/tmp/cache.json",
            "-o",
            "/tmp/feed.xml",
            "--retention",
            "10",
            "--delay-ms",
            "0",
        ]);
        assert_eq!(cli.cache_file, PathBuf::from("/tmp/cache.json"));
        assert_eq!(cli.feed_file, PathBuf::from("/tmp/feed.xml"));
        assert_eq!(cli.retention, 10);
        assert_eq!(cli.delay_ms, 0);
    }

    #[test]
    fn test_base_url_env_override() {
        // Process-global state; keep the set/assert/remove sequence inside
        // one test so it cannot race a parallel parse of the defaults.
        unsafe { std::env::set_var("LOKSUJAG_BASE_URL", "https://mirror.example") };
        let cli = Cli::parse_from(["loksujag_rss"]);
        assert_eq!(cli.base_url, "https://mirror.example");

        unsafe { std::env::remove_var("LOKSUJAG_BASE_URL") };
        let cli = Cli::parse_from(["loksujag_rss"]);
        assert_eq!(cli.base_url, "https://loksujag.com");
    }
}
