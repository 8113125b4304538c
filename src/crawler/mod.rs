//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The shared visited set and the crawl gate
//! - HTTP fetching and HTML link extraction
//! - Depth-bounded traversal from a seed
//! - The worker pool running seed traversals

mod fetcher;
mod gate;
mod parser;
mod pool;
mod traversal;
mod visited;

#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use gate::CrawlGate;
pub use parser::{HtmlLinkExtractor, LinkExtractor};
pub use pool::{PoolError, ShutdownReport, WorkerPool, DEFAULT_POOL_SIZE};
pub use traversal::{is_absolute_http, CrawlTask, Crawler, TraversalReport, DEFAULT_PACING};
pub use visited::VisitedSet;

use crate::config::{validate, Config};
use crate::output::StatsSnapshot;
use crate::storage::open_sink;
use crate::CrawlError;
use std::sync::Arc;
use std::time::Duration;

/// Everything a finished crawl reports back
#[derive(Debug)]
pub struct CrawlSummary {
    pub shutdown: ShutdownReport,
    pub stats: StatsSnapshot,
    /// Distinct URLs claimed during the crawl
    pub urls_claimed: usize,
}

/// Builds a crawler wired to the collaborators named in the configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Crawler)` - Crawler with an HTTP fetcher, HTML extractor and configured sink
/// * `Err(CrawlError)` - The HTTP client or the sink could not be created
pub fn build_crawler(config: &Config) -> Result<Crawler, CrawlError> {
    let fetcher = HttpFetcher::from_config(&config.user_agent, &config.crawler)?;
    let extractor = HtmlLinkExtractor::new(config.crawler.resolve_relative);
    let sink = open_sink(&config.output)?;

    if config.crawler.fetch_timeout_ms == 0 {
        tracing::warn!("No fetch timeout configured; a stalled fetch holds the crawl gate");
    }

    Ok(Crawler::new(Arc::new(fetcher), Arc::new(extractor), sink)
        .with_pacing(Duration::from_millis(config.crawler.pacing_ms)))
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration, then build the fetcher, extractor and sink
/// 2. Start the worker pool
/// 3. Submit every seed with the configured depth
/// 4. Shut the pool down, waiting up to the configured timeout
///
/// # Example
///
/// ```no_run
/// use shoal::config::load_config;
/// use shoal::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("shoal.toml"))?;
/// let summary = run_crawl(&config).await?;
/// println!("{} pages processed", summary.shutdown.pages_processed());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlSummary, CrawlError> {
    validate(config)?;
    let crawler = Arc::new(build_crawler(config)?);
    let mut pool = WorkerPool::new(config.crawler.pool_size, Arc::clone(&crawler))?;

    for (url, worker_id) in config.seed_tasks() {
        pool.submit(&url, config.crawler.max_depth, worker_id)?;
    }

    let shutdown = pool
        .shutdown(Duration::from_secs(config.crawler.shutdown_timeout_secs))
        .await;

    if shutdown.forced {
        tracing::warn!(
            "Crawl did not finish within {}s and was cancelled",
            config.crawler.shutdown_timeout_secs
        );
    }

    Ok(CrawlSummary {
        shutdown,
        stats: crawler.stats().snapshot(),
        urls_claimed: crawler.visited().len(),
    })
}
