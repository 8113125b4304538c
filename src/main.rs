//! Shoal main entry point
//!
//! This is the command-line interface for the Shoal link crawler.

use anyhow::Context;
use clap::Parser;
use shoal::config::{load_config_with_hash, validate, Config};
use shoal::crawler::run_crawl;
use shoal::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shoal: a bounded-depth concurrent link crawler
///
/// Shoal fetches every seed URL, follows the absolute links it finds up to
/// a depth limit and persists each fetched page, using a fixed pool of
/// workers that never fetch the same URL twice.
#[derive(Parser, Debug)]
#[command(name = "shoal")]
#[command(version)]
#[command(about = "A bounded-depth concurrent link crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Override the depth budget from the config file
    #[arg(long, value_name = "N")]
    depth: Option<u32>,

    /// Override the number of workers from the config file
    #[arg(long, value_name = "N")]
    pool_size: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(pool_size) = cli.pool_size {
        config.crawler.pool_size = pool_size;
    }
    validate(&config).context("invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(&config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shoal=info,warn"),
            1 => EnvFilter::new("shoal=debug,info"),
            2 => EnvFilter::new("shoal=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the validated crawl plan
fn handle_dry_run(config: &Config) {
    println!("=== Shoal Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Pool size: {}", config.crawler.pool_size);
    println!("  Pacing: {}ms", config.crawler.pacing_ms);
    match config.crawler.fetch_timeout_ms {
        0 => println!("  Fetch timeout: none"),
        ms => println!("  Fetch timeout: {}ms", ms),
    }
    println!(
        "  Shutdown timeout: {}s",
        config.crawler.shutdown_timeout_secs
    );
    println!("  Resolve relative links: {}", config.crawler.resolve_relative);

    println!("\nUser Agent:");
    println!(
        "  {}/{}",
        config.user_agent.crawler_name, config.user_agent.crawler_version
    );

    println!("\nOutput:");
    println!("  Kind: {:?}", config.output.kind);
    println!("  Path: {}", config.output.path);

    let seeds = config.seed_tasks();
    println!("\nSeeds ({}):", seeds.len());
    for (url, worker_id) in &seeds {
        println!("  - [{}] {}", worker_id, url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} seeds with {} workers to depth {}",
        config.seeds.len(),
        config.crawler.pool_size,
        config.crawler.max_depth
    );

    let summary = run_crawl(config).await.context("crawl failed")?;

    tracing::info!(
        "Crawl completed: {} pages processed, {} URLs claimed",
        summary.shutdown.pages_processed(),
        summary.urls_claimed
    );
    if summary.shutdown.lost_workers > 0 {
        tracing::warn!(
            "{} workers did not return a report",
            summary.shutdown.lost_workers
        );
    }

    print_statistics(&summary.stats);
    Ok(())
}
