//! Depth-bounded traversal from a single seed
//!
//! A visit claims its URL, runs fetch, persist and extract inside the crawl
//! gate, then dispatches every retained link with one less unit of depth.
//! Children are expanded depth-first on an explicit stack owned by the
//! calling worker, so the visit order matches a recursive walk without
//! growing the call stack.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::gate::CrawlGate;
use crate::crawler::parser::LinkExtractor;
use crate::crawler::visited::VisitedSet;
use crate::output::CrawlStatistics;
use crate::state::VisitOutcome;
use crate::storage::PageSink;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default delay before each child visit
pub const DEFAULT_PACING: Duration = Duration::from_millis(10);

/// A unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: String,
    pub remaining_depth: u32,
    pub worker_id: usize,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>, remaining_depth: u32, worker_id: usize) -> Self {
        Self {
            url: url.into(),
            remaining_depth,
            worker_id,
        }
    }

    /// Task for a link discovered on this task's page
    fn child(&self, url: String) -> Self {
        Self {
            url,
            remaining_depth: self.remaining_depth.saturating_sub(1),
            worker_id: self.worker_id,
        }
    }
}

/// What one call to [`Crawler::visit`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalReport {
    /// The URL the traversal started from
    pub seed: String,

    pub worker_id: usize,

    /// Claimed URLs in visit order with their outcome
    pub pages: Vec<(String, VisitOutcome)>,

    /// Visits that returned before claiming (depth or already claimed)
    pub skipped: u64,

    /// Links handed to child visits
    pub links_followed: u64,

    /// The traversal stopped early because of cancellation
    pub cancelled: bool,
}

impl TraversalReport {
    fn new(seed: &str, worker_id: usize) -> Self {
        Self {
            seed: seed.to_string(),
            worker_id,
            ..Self::default()
        }
    }

    fn record(&mut self, url: &str, outcome: VisitOutcome) {
        if outcome.is_skipped() {
            self.skipped += 1;
        } else {
            self.pages.push((url.to_string(), outcome));
        }
    }

    /// Number of pages fully processed
    pub fn processed(&self) -> usize {
        self.count(VisitOutcome::Processed)
    }

    /// Number of claimed pages that ended in a contained failure
    pub fn failed(&self) -> usize {
        self.pages
            .iter()
            .filter(|(_, outcome)| outcome.is_error())
            .count()
    }

    pub fn count(&self, outcome: VisitOutcome) -> usize {
        self.pages.iter().filter(|(_, o)| *o == outcome).count()
    }

    /// URLs that were claimed, in visit order
    pub fn urls(&self) -> Vec<&str> {
        self.pages.iter().map(|(url, _)| url.as_str()).collect()
    }
}

/// Result of the gated step for one page
struct PageResult {
    outcome: VisitOutcome,
    links: Vec<String>,
}

impl PageResult {
    fn terminal(outcome: VisitOutcome) -> Self {
        Self {
            outcome,
            links: Vec::new(),
        }
    }
}

/// Returns true for links the traversal is allowed to follow
pub fn is_absolute_http(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

/// The traversal engine shared by every worker
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    sink: Arc<dyn PageSink>,
    visited: Arc<VisitedSet>,
    gate: Arc<CrawlGate>,
    stats: Arc<CrawlStatistics>,
    pacing: Duration,
    cancel: CancellationToken,
}

impl Crawler {
    /// Creates a crawler with a fresh visited set, gate and statistics
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
        sink: Arc<dyn PageSink>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            sink,
            visited: Arc::new(VisitedSet::new()),
            gate: Arc::new(CrawlGate::new()),
            stats: Arc::new(CrawlStatistics::new()),
            pacing: DEFAULT_PACING,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn visited(&self) -> &Arc<VisitedSet> {
        &self.visited
    }

    pub fn stats(&self) -> &Arc<CrawlStatistics> {
        &self.stats
    }

    /// Requests every running traversal to stop at its next checkpoint
    ///
    /// Closes the gate as well, so visits waiting for it return at once.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.gate.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Crawls from `url` with a budget of `remaining_depth` hops
    ///
    /// A budget of 0, or a URL already claimed anywhere, returns immediately
    /// without touching the network. Failures are contained at the page that
    /// produced them and never reach the caller.
    pub async fn visit(&self, url: &str, remaining_depth: u32, worker_id: usize) -> TraversalReport {
        let mut report = TraversalReport::new(url, worker_id);
        let mut frontier = vec![CrawlTask::new(url, remaining_depth, worker_id)];
        let mut is_seed = true;

        while let Some(task) = frontier.pop() {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            if !is_seed && !self.pace().await {
                report.cancelled = true;
                break;
            }
            is_seed = false;

            let page = self.visit_page(&task).await;
            self.stats.record_outcome(page.outcome);
            report.record(&task.url, page.outcome);

            // Children at depth 0 would return on the budget check anyway
            if page.outcome.follows_links() && task.remaining_depth > 1 {
                report.links_followed += page.links.len() as u64;
                for link in page.links.into_iter().rev() {
                    frontier.push(task.child(link));
                }
            }
        }

        if report.cancelled {
            tracing::warn!(
                worker_id,
                seed = %url,
                "Traversal cancelled with {} tasks left in the frontier",
                frontier.len() + 1
            );
        }

        report
    }

    /// Waits the pacing interval, returning false if cancelled meanwhile
    async fn pace(&self) -> bool {
        if self.pacing.is_zero() {
            return !self.cancel.is_cancelled();
        }

        tokio::select! {
            _ = tokio::time::sleep(self.pacing) => true,
            _ = self.cancel.cancelled() => false,
        }
    }

    /// Applies the depth and claim checks, then runs the gated step
    async fn visit_page(&self, task: &CrawlTask) -> PageResult {
        if task.remaining_depth == 0 {
            tracing::trace!(worker_id = task.worker_id, "Depth exhausted at {}", task.url);
            return PageResult::terminal(VisitOutcome::DepthExhausted);
        }

        if !self.visited.claim(&task.url) {
            tracing::trace!(worker_id = task.worker_id, "Already claimed: {}", task.url);
            return PageResult::terminal(VisitOutcome::AlreadyClaimed);
        }

        match self
            .gate
            .with_exclusive(|| self.fetch_persist_extract(task))
            .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    url = %task.url,
                    worker_id = task.worker_id,
                    kind = "interrupted",
                    "Visit abandoned: {}",
                    e
                );
                PageResult::terminal(VisitOutcome::Interrupted)
            }
        }
    }

    /// Fetches, persists and extracts one page; runs inside the gate
    async fn fetch_persist_extract(&self, task: &CrawlTask) -> PageResult {
        tracing::info!(
            worker_id = task.worker_id,
            depth = task.remaining_depth,
            "Visiting {}",
            task.url
        );

        // Only the fetch is raced against cancellation; once bytes are in
        // hand the write completes before the gate is released.
        let fetched = tokio::select! {
            result = self.fetcher.fetch(&task.url) => result,
            _ = self.cancel.cancelled() => {
                tracing::warn!(
                    url = %task.url,
                    worker_id = task.worker_id,
                    kind = "interrupted",
                    "Fetch abandoned at shutdown"
                );
                return PageResult::terminal(VisitOutcome::Interrupted);
            }
        };

        let body = match fetched {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    url = %task.url,
                    worker_id = task.worker_id,
                    kind = e.kind(),
                    "Fetch failed: {}",
                    e
                );
                return PageResult::terminal(VisitOutcome::FetchFailed);
            }
        };
        self.stats.record_bytes(body.len());

        if let Err(e) = self.sink.write(&task.url, &body).await {
            tracing::warn!(
                url = %task.url,
                worker_id = task.worker_id,
                kind = e.kind(),
                "Persisting page failed: {}",
                e
            );
            return PageResult::terminal(VisitOutcome::WriteFailed);
        }

        let candidates = match self.extractor.extract_links(&task.url, &body) {
            Ok(links) => links,
            Err(e) => {
                tracing::debug!(
                    url = %task.url,
                    worker_id = task.worker_id,
                    kind = "extraction",
                    "No links extracted: {}",
                    e
                );
                self.stats.record_extraction_failure();
                Vec::new()
            }
        };

        let total = candidates.len();
        let links: Vec<String> = candidates
            .into_iter()
            .filter(|link| is_absolute_http(link))
            .collect();
        self.stats.record_links(links.len(), total - links.len());

        tracing::debug!(
            worker_id = task.worker_id,
            "Extracted {} links from {} ({} discarded)",
            links.len(),
            task.url,
            total - links.len()
        );

        PageResult {
            outcome: VisitOutcome::Processed,
            links,
        }
    }
}
