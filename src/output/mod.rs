//! Output module for crawl reporting
//!
//! This module handles recording crawl statistics and printing them at the
//! end of a run.

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics, StatsSnapshot};
