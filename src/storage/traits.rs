//! Persistence sink trait and error types
//!
//! A sink receives the raw bytes of every fetched page together with a name
//! (the page URL). Whether names map to distinct destinations is up to the
//! implementation.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while persisting a page
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("IO error writing {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error writing {name}: {source}")]
    Database {
        name: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl WriteError {
    /// Short label used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Database { .. } => "database",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// Result type for sink operations
pub type WriteResult<T> = Result<T, WriteError>;

/// Destination for fetched page content
///
/// Implementations must be safe to share between workers. A sink whose
/// destinations collide relies on the crawl gate for at most one writer at
/// a time.
#[async_trait]
pub trait PageSink: Send + Sync {
    /// Persists `bytes` under `name`
    async fn write(&self, name: &str, bytes: &[u8]) -> WriteResult<()>;
}
