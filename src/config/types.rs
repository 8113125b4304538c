use serde::Deserialize;

/// Main configuration structure for Shoal
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(rename = "seed", default)]
    pub seeds: Vec<SeedEntry>,
}

impl Config {
    /// Returns every seed paired with its worker id
    ///
    /// Seeds without an explicit `worker-id` are numbered by their 1-based
    /// position in the file.
    pub fn seed_tasks(&self) -> Vec<(String, usize)> {
        self.seeds
            .iter()
            .enumerate()
            .map(|(index, seed)| (seed.url.clone(), seed.worker_id.unwrap_or(index + 1)))
            .collect()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Depth budget given to every seed
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of workers running seed traversals at once
    #[serde(rename = "pool-size", default = "default_pool_size")]
    pub pool_size: usize,

    /// Delay before each child visit (milliseconds)
    #[serde(rename = "pacing-ms", default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Per-request timeout (milliseconds), 0 disables it
    #[serde(rename = "fetch-timeout-ms", default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// How long shutdown waits for in-flight work before aborting it (seconds)
    #[serde(rename = "shutdown-timeout-secs", default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Resolve relative hrefs against the page URL instead of dropping them
    #[serde(rename = "resolve-relative", default)]
    pub resolve_relative: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            pool_size: default_pool_size(),
            pacing_ms: default_pacing_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            resolve_relative: false,
        }
    }
}

fn default_max_depth() -> u32 {
    3
}

fn default_pool_size() -> usize {
    crate::crawler::DEFAULT_POOL_SIZE
}

fn default_pacing_ms() -> u64 {
    10
}

fn default_fetch_timeout_ms() -> u64 {
    30_000
}

fn default_shutdown_timeout_secs() -> u64 {
    60
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "shoal".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Where fetched pages are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputKind {
    /// Every page overwrites the same file
    SharedFile,
    /// One file per URL inside a directory
    PerPage,
    /// Rows in a SQLite database
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Sink implementation to use
    pub kind: OutputKind,

    /// File, directory or database path depending on `kind`
    pub path: String,
}

/// A seed URL with an optional worker label
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    pub url: String,

    #[serde(rename = "worker-id")]
    pub worker_id: Option<usize>,
}
