/// Visit outcome definitions for reporting crawl progress
///
/// Every call to visit a URL ends in exactly one of these outcomes.
use std::fmt;

/// Represents how a single visit attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitOutcome {
    // ===== Skip Outcomes =====
    /// The depth budget was exhausted before the URL was claimed
    DepthExhausted,

    /// Another visit (in this or another worker) already claimed the URL
    AlreadyClaimed,

    // ===== Success Outcomes =====
    /// Page was fetched, persisted and its links extracted
    Processed,

    // ===== Error Outcomes =====
    /// Page could not be fetched (network, timeout, HTTP status)
    FetchFailed,

    /// Page was fetched but could not be persisted
    WriteFailed,

    /// The gate wait was interrupted by shutdown
    Interrupted,
}

impl VisitOutcome {
    /// Returns true if the visit returned before any network activity
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::DepthExhausted | Self::AlreadyClaimed)
    }

    /// Returns true if the page was fully processed
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if the visit ended in a contained failure
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed | Self::WriteFailed | Self::Interrupted
        )
    }

    /// Returns true if the outcome permits following the page's links
    pub fn follows_links(&self) -> bool {
        self.is_success()
    }

    /// Stable string form used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepthExhausted => "depth_exhausted",
            Self::AlreadyClaimed => "already_claimed",
            Self::Processed => "processed",
            Self::FetchFailed => "fetch_failed",
            Self::WriteFailed => "write_failed",
            Self::Interrupted => "interrupted",
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> [Self; 6] {
        [
            Self::DepthExhausted,
            Self::AlreadyClaimed,
            Self::Processed,
            Self::FetchFailed,
            Self::WriteFailed,
            Self::Interrupted,
        ]
    }
}

impl fmt::Display for VisitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
