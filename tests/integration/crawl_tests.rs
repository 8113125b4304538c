//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the worker pool.

use shoal::config::{
    Config, CrawlerConfig, OutputConfig, OutputKind, SeedEntry, UserAgentConfig,
};
use shoal::crawler::{run_crawl, Crawler, HtmlLinkExtractor, HttpFetcher, WorkerPool};
use shoal::storage::{file_name_for, FileSink, SqliteSink};
use shoal::VisitOutcome;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with the given seeds and output
fn create_test_config(seeds: Vec<String>, output: OutputConfig, max_depth: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            pool_size: 3,
            pacing_ms: 1, // Very short for testing
            fetch_timeout_ms: 5_000,
            shutdown_timeout_secs: 30,
            resolve_relative: false,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
        },
        output,
        seeds: seeds
            .into_iter()
            .map(|url| SeedEntry {
                url,
                worker_id: None,
            })
            .collect(),
    }
}

fn html_page(links: &[String]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">link</a>"#, link))
        .collect();
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", anchors))
        .insert_header("content-type", "text/html")
}

/// Mounts a page that must be requested exactly `times` times
async fn mount_page(server: &MockServer, route: &str, links: &[String], times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(links))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_node_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/s1", &[format!("{}/c", base)], 1).await;
    mount_page(&server, "/s2", &[format!("{}/c", base)], 1).await;
    mount_page(&server, "/c", &[format!("{}/deep", base)], 1).await;
    mount_page(&server, "/deep", &[], 0).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pages.db");
    let config = create_test_config(
        vec![format!("{}/s1", base), format!("{}/s2", base)],
        OutputConfig {
            kind: OutputKind::Sqlite,
            path: db_path.display().to_string(),
        },
        2,
    );

    let summary = run_crawl(&config).await.expect("Crawl failed");

    assert!(!summary.shutdown.forced);
    assert_eq!(summary.shutdown.reports.len(), 2);
    assert_eq!(summary.shutdown.pages_processed(), 3);
    assert_eq!(summary.stats.count(VisitOutcome::Processed), 3);
    assert_eq!(summary.urls_claimed, 3);

    let storage = SqliteSink::new(&db_path).expect("Failed to open DB");
    assert_eq!(storage.count_pages().unwrap(), 3);
    assert!(storage
        .get_page(&format!("{}/c", base))
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_cycle_visited_once_over_http() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/a", &[format!("{}/b", base)], 1).await;
    mount_page(&server, "/b", &[format!("{}/a", base)], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(
        vec![format!("{}/a", base)],
        OutputConfig {
            kind: OutputKind::PerPage,
            path: dir.path().join("pages").display().to_string(),
        },
        6,
    );

    let summary = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(summary.shutdown.pages_processed(), 2);
    assert_eq!(summary.stats.count(VisitOutcome::AlreadyClaimed), 1);

    for route in ["/a", "/b"] {
        let file = dir
            .path()
            .join("pages")
            .join(file_name_for(&format!("{}{}", base, route)));
        assert!(file.exists(), "missing page file for {}", route);
    }
}

#[tokio::test]
async fn test_failed_page_links_not_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        &[format!("{}/broken", base), format!("{}/ok", base)],
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string(format!(r#"<a href="{}/never">never</a>"#, base)),
        )
        .expect(1)
        .mount(&server)
        .await;

    mount_page(&server, "/never", &[], 0).await;
    mount_page(&server, "/ok", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(
        vec![format!("{}/", base)],
        OutputConfig {
            kind: OutputKind::SharedFile,
            path: dir.path().join("Links.txt").display().to_string(),
        },
        3,
    );

    let summary = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(summary.stats.count(VisitOutcome::FetchFailed), 1);
    assert_eq!(summary.stats.count(VisitOutcome::Processed), 2);
    // The shared file holds whichever page was written last
    assert!(dir.path().join("Links.txt").exists());
}

#[tokio::test]
async fn test_relative_links_need_resolution() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/relative".to_string()]))
        .mount(&server)
        .await;

    // Default policy keeps hrefs verbatim, so "/relative" is dropped
    mount_page(&server, "/relative", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let output = OutputConfig {
        kind: OutputKind::PerPage,
        path: dir.path().display().to_string(),
    };

    let verbatim = create_test_config(vec![format!("{}/", base)], output.clone(), 2);
    let summary = run_crawl(&verbatim).await.expect("Crawl failed");
    assert_eq!(summary.shutdown.pages_processed(), 1);
    assert_eq!(summary.stats.links_discarded, 1);

    let mut resolving = create_test_config(vec![format!("{}/", base)], output, 2);
    resolving.crawler.resolve_relative = true;
    let summary = run_crawl(&resolving).await.expect("Crawl failed");
    assert_eq!(summary.shutdown.pages_processed(), 2);
}

#[tokio::test]
async fn test_pool_with_hand_built_crawler() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/one", &[format!("{}/two", base)], 1).await;
    mount_page(&server, "/two", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::from_config(&UserAgentConfig::default(), &CrawlerConfig::default())
        .expect("Failed to build client");
    let crawler = Arc::new(
        Crawler::new(
            Arc::new(fetcher),
            Arc::new(HtmlLinkExtractor::default()),
            Arc::new(FileSink::shared(dir.path().join("out.html"))),
        )
        .with_pacing(Duration::from_millis(1)),
    );

    let mut pool = WorkerPool::new(3, Arc::clone(&crawler)).unwrap();
    pool.submit(&format!("{}/one", base), 2, 1).unwrap();
    // Depth 0 seeds never reach the network
    pool.submit(&format!("{}/two", base), 0, 2).unwrap();

    let report = pool.shutdown(Duration::from_secs(30)).await;

    assert!(!report.forced);
    assert_eq!(report.pages_processed(), 2);
    assert!(crawler.visited().contains(&format!("{}/two", base)));
}

#[tokio::test]
async fn test_stalled_fetch_cancelled_at_shutdown() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stall"))
        .respond_with(html_page(&[]).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(
        vec![format!("{}/stall", server.uri())],
        OutputConfig {
            kind: OutputKind::PerPage,
            path: dir.path().display().to_string(),
        },
        1,
    );
    config.crawler.fetch_timeout_ms = 0;
    config.crawler.shutdown_timeout_secs = 1;

    let started = std::time::Instant::now();
    let summary = run_crawl(&config).await.expect("Crawl failed");

    assert!(summary.shutdown.forced);
    assert_eq!(summary.shutdown.pages_processed(), 0);
    assert!(started.elapsed() < Duration::from_secs(10));
}
