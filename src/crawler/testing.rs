//! In-memory collaborators for crawler tests

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::LinkExtractor;
use crate::storage::{PageSink, WriteError, WriteResult};
use crate::{ExtractionError, FetchError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Serves a fixed link graph; each body lists the page's links one per line
#[derive(Default)]
pub struct GraphFetcher {
    graph: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    delay: Duration,
    fetched: Mutex<Vec<String>>,
    inside: AtomicUsize,
    pub max_concurrent: AtomicUsize,
}

impl GraphFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.graph
            .insert(url.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    /// A page whose fetch always fails even though it has links
    pub fn failing_page(mut self, url: &str, links: &[&str]) -> Self {
        self.failing.insert(url.to_string());
        self.page(url, links)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fetches(&self, url: &str) -> usize {
        self.fetched
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    pub fn total_fetches(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    /// Fetched URLs in call order
    pub fn order(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for GraphFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let now = self.inside.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(now, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(url.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.inside.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(url) {
            return Err(FetchError::Network {
                url: url.to_string(),
                message: "connection reset".to_string(),
            });
        }

        match self.graph.get(url) {
            Some(links) => Ok(links.join("\n").into_bytes()),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Treats every non-empty line of the body as a link
pub struct LineExtractor;

impl LinkExtractor for LineExtractor {
    fn extract_links(&self, page_url: &str, body: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let text = std::str::from_utf8(body).map_err(|_| ExtractionError::NotText {
            url: page_url.to_string(),
        })?;
        Ok(text
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Always fails
pub struct FailingExtractor;

impl LinkExtractor for FailingExtractor {
    fn extract_links(&self, page_url: &str, _body: &[u8]) -> Result<Vec<String>, ExtractionError> {
        Err(ExtractionError::NotText {
            url: page_url.to_string(),
        })
    }
}

/// Records written names; optionally rejects one name
#[derive(Default)]
pub struct MemorySink {
    written: Mutex<Vec<String>>,
    reject: Option<String>,
    delay: Duration,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(name: &str) -> Self {
        Self {
            reject: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Every write sleeps this long before it is recorded
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn names(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSink for MemorySink {
    async fn write(&self, name: &str, _bytes: &[u8]) -> WriteResult<()> {
        if self.reject.as_deref() == Some(name) {
            return Err(WriteError::Unavailable(format!("refusing {}", name)));
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.written.lock().unwrap().push(name.to_string());
        Ok(())
    }
}
