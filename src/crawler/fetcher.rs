//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with a proper user agent string
//! - GET requests returning the raw page bytes
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Retrieves the raw content of a URL
///
/// Any error is terminal for that URL; callers never retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetch_timeout` - Whole-request timeout, `None` for no limit
///
/// # Example
///
/// ```no_run
/// use shoal::config::UserAgentConfig;
/// use shoal::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Some(Duration::from_secs(30))).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch_timeout: Option<Duration>,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version
    let user_agent = format!("{}/{}", user_agent.crawler_name, user_agent.crawler_version);

    let mut builder = Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = fetch_timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Fetcher backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    ///
    /// A `fetch-timeout-ms` of 0 leaves requests unbounded.
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, reqwest::Error> {
        let timeout = match crawler.fetch_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        Ok(Self::new(build_http_client(user_agent, timeout)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL and returns its body
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | body bytes |
    /// | other status | `FetchError::Status` |
    /// | timeout | `FetchError::Timeout` |
    /// | connect/DNS/TLS/invalid URL | `FetchError::Network` |
    /// | body read failure | `FetchError::Body` |
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(body.to_vec())
    }
}

/// Maps a transport error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
