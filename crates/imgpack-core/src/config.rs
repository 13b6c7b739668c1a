//! Configuration module
//!
//! Tunables for the fetch pipeline: byte and time budgets, worker-pool
//! size, and the trusted-host allowlist. Every value is defaulted and can
//! be overridden through `IMGPACK_*` environment variables.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MIN_FILE_SIZE_BYTES: u64 = 1024;
const TIMEOUT_SECONDS: u64 = 30;
const CONCURRENCY: usize = 5;

/// Default trusted media hosts. Entries match the hostname exactly or as a
/// dot-separated suffix (`unsplash.com` also matches `images.unsplash.com`).
const DEFAULT_ALLOWED_DOMAINS: &str =
    "unsplash.com,pexels.com,pixabay.com,staticflickr.com,wikimedia.org";

/// Fetch pipeline configuration.
///
/// An empty `allowed_domains` list rejects every URL; the allowlist never
/// falls open when misconfigured.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Per-item download ceiling in bytes.
    pub max_file_size_bytes: u64,
    /// Successful payloads below this size are rejected (error pages
    /// masquerading as images are rarely this small).
    pub min_file_size_bytes: u64,
    /// Wall-clock deadline per download, covering connect, headers, and
    /// the full body transfer.
    pub timeout_seconds: u64,
    /// Maximum simultaneous in-flight downloads per batch.
    pub concurrency: usize,
    /// Trusted hostnames; exact or dot-suffix matching, case-insensitive.
    pub allowed_domains: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            min_file_size_bytes: MIN_FILE_SIZE_BYTES,
            timeout_seconds: TIMEOUT_SECONDS,
            concurrency: CONCURRENCY,
            allowed_domains: split_list(DEFAULT_ALLOWED_DOMAINS),
        }
    }
}

impl FetcherConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let max_file_size_bytes = env::var("IMGPACK_MAX_FILE_SIZE_BYTES")
            .unwrap_or_else(|_| MAX_FILE_SIZE_BYTES.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_FILE_SIZE_BYTES);

        let min_file_size_bytes = env::var("IMGPACK_MIN_FILE_SIZE_BYTES")
            .unwrap_or_else(|_| MIN_FILE_SIZE_BYTES.to_string())
            .parse::<u64>()
            .unwrap_or(MIN_FILE_SIZE_BYTES);

        let timeout_seconds = env::var("IMGPACK_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| TIMEOUT_SECONDS.to_string())
            .parse::<u64>()
            .unwrap_or(TIMEOUT_SECONDS);

        let concurrency = env::var("IMGPACK_CONCURRENCY")
            .unwrap_or_else(|_| CONCURRENCY.to_string())
            .parse::<usize>()
            .unwrap_or(CONCURRENCY);
        if concurrency == 0 {
            return Err(anyhow::anyhow!("IMGPACK_CONCURRENCY must be at least 1"));
        }

        let allowed_domains = split_list(
            &env::var("IMGPACK_ALLOWED_DOMAINS")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_DOMAINS.to_string()),
        );

        Ok(Self {
            max_file_size_bytes,
            min_file_size_bytes,
            timeout_seconds,
            concurrency,
            allowed_domains,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FetcherConfig::default();
        assert_eq!(config.max_file_size_bytes, 5_242_880);
        assert_eq!(config.min_file_size_bytes, 1_024);
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.concurrency, 5);
        assert!(!config.allowed_domains.is_empty());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_split_list_trims_and_folds_case() {
        let list = split_list(" Unsplash.com , pexels.com ,, ");
        assert_eq!(list, vec!["unsplash.com", "pexels.com"]);
    }

    #[test]
    fn test_split_list_empty_input() {
        assert!(split_list("").is_empty());
        assert!(split_list(" , ,").is_empty());
    }
}
