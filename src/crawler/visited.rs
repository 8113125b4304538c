//! Shared record of claimed URLs
//!
//! URLs are compared as exact strings; no normalization takes place.

use dashmap::DashSet;

/// Concurrency-safe set of URLs claimed for crawling
///
/// Shared by reference between every worker. Membership only grows.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically inserts `url` if absent
    ///
    /// Returns true iff this call performed the insertion, which makes the
    /// caller the sole owner of the URL's visit.
    pub fn claim(&self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    /// Returns true if `url` has been claimed (reporting only)
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
