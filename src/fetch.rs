//! HTTP page fetcher with bounded retry and exponential backoff.
//!
//! All network access in the scraper goes through [`PageFetcher`]. The
//! fetcher owns a single [`reqwest::Client`] so connections are reused
//! across requests, and converts every transport error or non-2xx status
//! into a retryable failure. After the configured number of attempts it
//! returns a [`FetchError`] instead of panicking or propagating the raw
//! transport error; callers treat that as a terminal per-item failure.

use std::{fmt, time::Duration};

use reqwest::Client;
use tokio::time::sleep;

use crate::warning;

/// Retry policy and client identity for a [`PageFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Total attempts per URL (not additional retries). Minimum 1.
    pub retries: u32,
    /// Base backoff delay; attempt n waits `backoff * 2^(n-1)`.
    pub backoff: Duration,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff: Duration::from_secs(2),
            user_agent: crate::config::user_agent(),
            timeout: Duration::from_secs(crate::config::request_timeout_secs()),
        }
    }
}

/// A fetch that failed after exhausting every attempt.
#[derive(Debug)]
pub struct FetchError {
    pub url: String,
    pub reason: String,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to fetch {}: {}", self.url, self.reason)
    }
}

impl std::error::Error for FetchError {}

pub struct PageFetcher {
    client: Client,
    config: FetcherConfig,
}

impl PageFetcher {
    pub fn new(config: FetcherConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Fetches a page and returns its body as text.
    ///
    /// Any transport error or non-2xx status counts as a failed attempt.
    /// Between attempts the fetcher sleeps `backoff * 2^(attempt-1)`;
    /// after the last attempt the error is returned without sleeping.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let attempts = self.config.retries.max(1);
        let mut last_reason = String::new();

        for attempt in 1..=attempts {
            match self.try_get(url).await {
                Ok(body) => return Ok(body),
                Err(reason) => {
                    warning!("attempt {}/{} failed for {}: {}", attempt, attempts, url, reason);
                    last_reason = reason;
                    if attempt < attempts {
                        let wait = self
                            .config
                            .backoff
                            .saturating_mul(2u32.saturating_pow(attempt - 1));
                        sleep(wait).await;
                    }
                }
            }
        }

        Err(FetchError {
            url: url.to_string(),
            reason: last_reason,
        })
    }

    async fn try_get(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let response = response.error_for_status().map_err(|e| e.to_string())?;
        response.text().await.map_err(|e| e.to_string())
    }
}
