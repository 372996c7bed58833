//! HTTP fetch layer
//!
//! One politely-delayed, retried GET per call. The politeness delay applies
//! before every attempt, including the first; retries happen only for status
//! codes the configuration marks as transient, with a fixed delay between
//! attempts. Everything else is terminal for that URL and nothing here ever
//! aborts the crawl cycle.

use crate::config::Settings;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Browser-style user agent; several of the supported sites serve reduced
/// markup to obvious bot agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Terminal fetch failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("retries exhausted after {attempts} attempts for {url} (last status {status})")]
    RetriesExhausted {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("network error for {url}: {source}")]
    Network {
        url: String,
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Bounded-retry policy consumed by the fetch client
///
/// Kept separate from the traversal loop so the retry behavior is a single
/// testable value, not logic scattered through the engine.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per URL, first one included
    pub max_retries: u32,

    /// Politeness delay before every attempt
    pub request_delay: Duration,

    /// Fixed delay between retry attempts
    pub retry_delay: Duration,

    /// Status codes considered transient
    pub retry_status_codes: Vec<u16>,
}

impl RetryPolicy {
    /// Builds the policy from global settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_retries: settings.max_retries,
            request_delay: Duration::from_millis(settings.request_delay_ms),
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
            retry_status_codes: settings.retry_status_codes.clone(),
        }
    }

    fn is_retryable(&self, status: u16) -> bool {
        self.retry_status_codes.contains(&status)
    }
}

/// Builds the HTTP client shared by all fetches in a cycle
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs politely-delayed, retried GETs
pub struct FetchClient {
    client: Client,
    policy: RetryPolicy,
}

impl FetchClient {
    /// Creates a fetch client from global settings
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client()?,
            policy: RetryPolicy::from_settings(settings),
        })
    }

    /// Creates a fetch client with an explicit policy
    pub fn with_policy(policy: RetryPolicy) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client()?,
            policy,
        })
    }

    /// Fetches one URL, returning the response body
    ///
    /// # Errors
    ///
    /// * `Status` - Non-retryable HTTP error, returned immediately
    /// * `RetriesExhausted` - A retryable status on every attempt
    /// * `Network` - Connection, TLS, or timeout failure (terminal)
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let mut attempt = 1;
        loop {
            // Politeness delay, applied before the first attempt too
            tokio::time::sleep(self.policy.request_delay).await;

            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|source| FetchError::Network {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();
            if status.is_success() {
                return response.text().await.map_err(|source| FetchError::Network {
                    url: url.to_string(),
                    source,
                });
            }

            let code = status.as_u16();
            if !self.policy.is_retryable(code) {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: code,
                });
            }

            if attempt >= self.policy.max_retries {
                tracing::error!("Max retries reached for URL: {}", url);
                return Err(FetchError::RetriesExhausted {
                    url: url.to_string(),
                    status: code,
                    attempts: attempt,
                });
            }

            tracing::warn!(
                "Received {} for URL: {}. Attempt {}/{}, retrying after {:?}",
                code,
                url,
                attempt,
                self.policy.max_retries,
                self.policy.retry_delay
            );
            tokio::time::sleep(self.policy.retry_delay).await;
            attempt += 1;
        }
    }
}
