//! Mutual exclusion around the fetch, persist and extract step

use crate::CrawlError;
use std::future::Future;
use tokio::sync::Semaphore;

/// A single-permit gate shared by all workers
///
/// At most one closure runs inside [`CrawlGate::with_exclusive`] at any
/// instant. Waiters are admitted in arrival order.
#[derive(Debug)]
pub struct CrawlGate {
    permit: Semaphore,
}

impl Default for CrawlGate {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlGate {
    pub fn new() -> Self {
        Self {
            permit: Semaphore::new(1),
        }
    }

    /// Runs `f` while holding the gate
    ///
    /// Waits as long as another holder is inside. The permit is released when
    /// `f` completes, fails, or the returned future is dropped.
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - The value produced by `f`
    /// * `Err(CrawlError::InterruptedWait)` - The gate was closed while waiting
    pub async fn with_exclusive<F, Fut, T>(&self, f: F) -> Result<T, CrawlError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _permit = self
            .permit
            .acquire()
            .await
            .map_err(|_| CrawlError::InterruptedWait)?;
        Ok(f().await)
    }

    /// Rejects current and future waiters
    ///
    /// A holder already inside finishes normally.
    pub fn close(&self) {
        self.permit.close();
    }

    pub fn is_closed(&self) -> bool {
        self.permit.is_closed()
    }
}
