//! Shoal: a bounded-depth concurrent link crawler
//!
//! This crate fetches pages from a set of seed URLs, extracts their outbound
//! links and follows unseen links up to a depth limit, using a fixed pool of
//! workers that share a visited set and a single fetch gate.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Shoal operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Write error: {0}")]
    Write(#[from] storage::WriteError),

    #[error("Worker pool error: {0}")]
    Pool(#[from] crawler::PoolError),

    #[error("Wait interrupted by shutdown")]
    InterruptedWait,

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while retrieving a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// Short label used in log fields and statistics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "status",
            Self::Body { .. } => "body",
        }
    }
}

/// Errors raised while turning page content into links
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("content of {url} is binary, not text")]
    NotText { url: String },
}

/// Result type alias for Shoal operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlGate, Crawler, VisitedSet, WorkerPool};
pub use state::VisitOutcome;
