//! Fixed-size pool of workers running seed traversals
//!
//! Each worker takes one seed task at a time from a shared queue and runs
//! its whole traversal before taking the next. Links discovered during a
//! traversal never become pool tasks, so the pool size bounds how many seeds
//! are in progress at once.

use crate::crawler::traversal::{CrawlTask, Crawler, TraversalReport};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Default number of workers
pub const DEFAULT_POOL_SIZE: usize = 3;

/// How long cancelled workers get to return their reports before being aborted
const CANCEL_GRACE: Duration = Duration::from_millis(250);

/// Errors surfaced by the pool's submission surface
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker pool is shut down, rejected {url}")]
    ShutDown { url: String },

    #[error("worker pool needs at least one worker")]
    NoWorkers,
}

/// How a shutdown ended
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// The timeout elapsed and outstanding work was cancelled
    pub forced: bool,

    /// Reports of every seed traversal that returned
    pub reports: Vec<TraversalReport>,

    /// Workers that panicked or were aborted
    pub lost_workers: usize,
}

impl ShutdownReport {
    pub fn pages_processed(&self) -> usize {
        self.reports.iter().map(TraversalReport::processed).sum()
    }
}

type TaskQueue = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<CrawlTask>>>;

/// A fixed set of workers sharing one [`Crawler`]
pub struct WorkerPool {
    sender: Mutex<Option<mpsc::UnboundedSender<CrawlTask>>>,
    workers: JoinSet<Vec<TraversalReport>>,
    crawler: Arc<Crawler>,
    size: usize,
}

impl WorkerPool {
    /// Spawns `size` workers on the current tokio runtime
    pub fn new(size: usize, crawler: Arc<Crawler>) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::NoWorkers);
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let queue: TaskQueue = Arc::new(tokio::sync::Mutex::new(receiver));

        let mut workers = JoinSet::new();
        for index in 0..size {
            workers.spawn(run_worker(index, Arc::clone(&queue), Arc::clone(&crawler)));
        }

        tracing::debug!("Started worker pool with {} workers", size);

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers,
            crawler,
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Queues an independent seed traversal
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The task will run on the next free worker
    /// * `Err(PoolError::ShutDown)` - Shutdown has started
    pub fn submit(&self, seed_url: &str, depth: u32, worker_id: usize) -> Result<(), PoolError> {
        let rejected = || PoolError::ShutDown {
            url: seed_url.to_string(),
        };

        let guard = self.sender.lock().map_err(|_| rejected())?;
        let sender = guard.as_ref().ok_or_else(rejected)?;
        sender
            .send(CrawlTask::new(seed_url, depth, worker_id))
            .map_err(|_| rejected())?;

        tracing::debug!(worker_id, depth, "Submitted seed {}", seed_url);
        Ok(())
    }

    /// Stops accepting seeds and waits for queued and running traversals
    ///
    /// If `timeout` elapses first, running traversals are asked to stop,
    /// given a short grace period, then aborted.
    pub async fn shutdown(&mut self, timeout: Duration) -> ShutdownReport {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }

        let mut report = ShutdownReport::default();
        let deadline = Instant::now() + timeout;

        loop {
            match tokio::time::timeout_at(deadline, self.workers.join_next()).await {
                Ok(Some(joined)) => collect(joined, &mut report),
                Ok(None) => return report,
                Err(_) => break,
            }
        }

        tracing::warn!(
            "Shutdown timeout of {:?} elapsed, cancelling outstanding work",
            timeout
        );
        report.forced = true;
        self.crawler.cancel();

        let grace = Instant::now() + CANCEL_GRACE;
        loop {
            match tokio::time::timeout_at(grace, self.workers.join_next()).await {
                Ok(Some(joined)) => collect(joined, &mut report),
                Ok(None) => return report,
                Err(_) => break,
            }
        }

        self.workers.abort_all();
        while let Some(joined) = self.workers.join_next().await {
            collect(joined, &mut report);
        }

        report
    }
}

/// Folds one finished worker into the shutdown report
fn collect(
    joined: Result<Vec<TraversalReport>, tokio::task::JoinError>,
    report: &mut ShutdownReport,
) {
    match joined {
        Ok(reports) => report.reports.extend(reports),
        Err(e) if e.is_cancelled() => {
            tracing::warn!("Worker aborted before finishing");
            report.lost_workers += 1;
        }
        Err(e) => {
            tracing::error!("Worker panicked: {}", e);
            report.lost_workers += 1;
        }
    }
}

/// Takes seed tasks until the queue closes or the crawl is cancelled
async fn run_worker(index: usize, queue: TaskQueue, crawler: Arc<Crawler>) -> Vec<TraversalReport> {
    let mut reports = Vec::new();

    loop {
        let next = {
            let mut receiver = queue.lock().await;
            receiver.recv().await
        };

        let Some(task) = next else {
            break;
        };

        if crawler.is_cancelled() {
            tracing::debug!(worker = index, "Dropping seed {} after cancellation", task.url);
            break;
        }

        tracing::info!(
            worker = index,
            worker_id = task.worker_id,
            depth = task.remaining_depth,
            "Starting traversal from {}",
            task.url
        );

        let report = crawler
            .visit(&task.url, task.remaining_depth, task.worker_id)
            .await;

        tracing::info!(
            worker = index,
            worker_id = task.worker_id,
            "Finished traversal from {}: {} processed, {} failed, {} skipped",
            task.url,
            report.processed(),
            report.failed(),
            report.skipped
        );
        reports.push(report);
    }

    reports
}
