//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `VisitOutcome`: how a single visit ended (skipped, processed or failed)

mod visit_outcome;

pub use visit_outcome::VisitOutcome;
