//! Environment-driven configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Default poll interval, used when `POLL_INTERVAL_MS` is unset or does
/// not parse.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

/// Default session file path.
pub const DEFAULT_SESSION_FILE: &str = "./ig-session.json";

/// Default story seen-set path.
pub const DEFAULT_SEEN_STORIES_FILE: &str = "./seen-stories.json";

/// Default feed seen-set path.
pub const DEFAULT_SEEN_FEEDS_FILE: &str = "./seen-feeds.json";

/// Watcher configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Content-source login handle.
    pub username: String,
    /// Content-source login secret.
    pub password: String,
    /// Target account handles to poll.
    pub targets: Vec<String>,
    /// Poll interval between cycles.
    pub poll_interval: Duration,
    /// Session blob persistence path.
    pub session_file: PathBuf,
    /// Story seen-set persistence path.
    pub seen_stories_file: PathBuf,
    /// Feed seen-set persistence path.
    pub seen_feeds_file: PathBuf,
    /// Feed filter keywords, lowercased. Empty disables the feed channel.
    pub keywords: Vec<String>,
}

impl Config {
    /// Create configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `IG_USERNAME`: content-source login handle
    /// - `IG_PASSWORD`: content-source login secret
    /// - `TARGET_ACCOUNTS`: comma-separated handles to poll
    ///
    /// # Optional Environment Variables
    /// - `POLL_INTERVAL_MS`: poll interval (default: 10000)
    /// - `SESSION_FILE`: session path (default: ./ig-session.json)
    /// - `DUP_PERSIST_PATH`: story seen-set path (default: ./seen-stories.json)
    /// - `SEEN_FEEDS_FILE`: feed seen-set path (default: ./seen-feeds.json)
    /// - `FILTER_KEYWORDS`: comma-separated keywords; absent/empty
    ///   disables feed filtering entirely
    ///
    /// The webhook endpoint (`WA_BOT_ENDPOINT`) is read by the notify
    /// crate, not here.
    pub fn from_env() -> Result<Self> {
        let username =
            std::env::var("IG_USERNAME").context("IG_USERNAME environment variable not set")?;
        let password =
            std::env::var("IG_PASSWORD").context("IG_PASSWORD environment variable not set")?;
        let targets_raw = std::env::var("TARGET_ACCOUNTS")
            .context("TARGET_ACCOUNTS environment variable not set")?;

        let poll_interval = parse_interval(std::env::var("POLL_INTERVAL_MS").ok().as_deref());

        let session_file = std::env::var("SESSION_FILE")
            .unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string())
            .into();
        let seen_stories_file = std::env::var("DUP_PERSIST_PATH")
            .unwrap_or_else(|_| DEFAULT_SEEN_STORIES_FILE.to_string())
            .into();
        let seen_feeds_file = std::env::var("SEEN_FEEDS_FILE")
            .unwrap_or_else(|_| DEFAULT_SEEN_FEEDS_FILE.to_string())
            .into();

        let keywords = parse_keywords(std::env::var("FILTER_KEYWORDS").ok().as_deref());

        Ok(Self {
            username,
            password,
            targets: parse_list(&targets_raw),
            poll_interval,
            session_file,
            seen_stories_file,
            seen_feeds_file,
            keywords,
        })
    }
}

/// Split a comma-separated list, trimming entries and dropping empties.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Keywords are matched case-insensitively; lowercase them once here.
fn parse_keywords(raw: Option<&str>) -> Vec<String> {
    raw.map(|r| parse_list(&r.to_lowercase())).unwrap_or_default()
}

/// Parse the poll interval, falling back to the default on anything
/// unset, unparsable, or zero. The scheduler requires a non-zero
/// period.
fn parse_interval(raw: Option<&str>) -> Duration {
    let millis = raw
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&ms| ms > 0)
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_trims_and_drops_empties() {
        assert_eq!(
            parse_list("alice, bob ,,carol"),
            vec!["alice", "bob", "carol"]
        );
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_keywords_are_lowercased() {
        assert_eq!(
            parse_keywords(Some("SALE, Promo")),
            vec!["sale", "promo"]
        );
        assert!(parse_keywords(None).is_empty());
        assert!(parse_keywords(Some("")).is_empty());
    }

    #[test]
    fn test_interval_falls_back_on_garbage() {
        assert_eq!(parse_interval(Some("5000")), Duration::from_millis(5000));
        assert_eq!(
            parse_interval(Some("not-a-number")),
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
        );
        // A zero period would abort the scheduler at startup.
        assert_eq!(
            parse_interval(Some("0")),
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
        );
        assert_eq!(
            parse_interval(None),
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
        );
    }
}
