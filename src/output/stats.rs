//! Crawl statistics shared by all workers
//!
//! Counters are updated with relaxed atomics from every worker and read back
//! as a consistent-enough snapshot at the end of a run.

use crate::state::VisitOutcome;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for a crawl
#[derive(Debug, Default)]
pub struct CrawlStatistics {
    depth_exhausted: AtomicU64,
    already_claimed: AtomicU64,
    processed: AtomicU64,
    fetch_failed: AtomicU64,
    write_failed: AtomicU64,
    interrupted: AtomicU64,
    extraction_failed: AtomicU64,
    links_discovered: AtomicU64,
    links_discarded: AtomicU64,
    bytes_fetched: AtomicU64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one finished visit
    pub fn record_outcome(&self, outcome: VisitOutcome) {
        self.counter(outcome).fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a page whose content yielded no parseable links
    pub fn record_extraction_failure(&self) {
        self.extraction_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts links kept for dispatch and links dropped as non-absolute
    pub fn record_links(&self, kept: usize, discarded: usize) {
        self.links_discovered
            .fetch_add(kept as u64, Ordering::Relaxed);
        self.links_discarded
            .fetch_add(discarded as u64, Ordering::Relaxed);
    }

    pub fn record_bytes(&self, bytes: usize) {
        self.bytes_fetched.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    fn counter(&self, outcome: VisitOutcome) -> &AtomicU64 {
        match outcome {
            VisitOutcome::DepthExhausted => &self.depth_exhausted,
            VisitOutcome::AlreadyClaimed => &self.already_claimed,
            VisitOutcome::Processed => &self.processed,
            VisitOutcome::FetchFailed => &self.fetch_failed,
            VisitOutcome::WriteFailed => &self.write_failed,
            VisitOutcome::Interrupted => &self.interrupted,
        }
    }

    /// Takes a point-in-time copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        let outcomes = VisitOutcome::all()
            .into_iter()
            .map(|outcome| (outcome, self.counter(outcome).load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();

        StatsSnapshot {
            outcomes,
            extraction_failed: self.extraction_failed.load(Ordering::Relaxed),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            links_discarded: self.links_discarded.load(Ordering::Relaxed),
            bytes_fetched: self.bytes_fetched.load(Ordering::Relaxed),
        }
    }
}

/// Frozen view of [`CrawlStatistics`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Count of visits by outcome (zero counts omitted)
    pub outcomes: HashMap<VisitOutcome, u64>,

    pub extraction_failed: u64,

    pub links_discovered: u64,

    pub links_discarded: u64,

    pub bytes_fetched: u64,
}

impl StatsSnapshot {
    pub fn count(&self, outcome: VisitOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Visits that went past the claim and touched the network
    pub fn pages_attempted(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| !outcome.is_skipped())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StatsSnapshot) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages attempted: {}", stats.pages_attempted());
    println!("  Bytes fetched: {}", stats.bytes_fetched);
    println!("  Links followed: {}", stats.links_discovered);
    println!("  Links discarded (not absolute): {}", stats.links_discarded);
    println!();

    println!("Visits by Outcome:");
    let mut outcome_counts: Vec<_> = stats.outcomes.iter().collect();
    outcome_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (outcome, count) in outcome_counts {
        println!("  {}: {}", outcome, count);
    }
    println!();

    if stats.extraction_failed > 0 {
        println!(
            "Pages without parseable content: {}",
            stats.extraction_failed
        );
        println!();
    }

    let attempted = stats.pages_attempted();
    let processed = stats.count(VisitOutcome::Processed);
    let success_rate = if attempted > 0 {
        (processed as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        success_rate, processed, attempted
    );
}
