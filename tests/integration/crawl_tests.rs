//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and exercise full
//! crawl cycles end-to-end: discovery, classification, extraction, the
//! visited ledger, and the on-disk archive.

use news_archiver::config::{Config, OutputConfig, PublisherConfig, Settings};
use news_archiver::CrawlEngine;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration aimed at a mock server
fn test_config(base_url: &str, data_dir: &str) -> Config {
    Config {
        settings: Settings {
            active_publisher: "dantri".to_string(),
            max_urls_per_cycle: 500,
            max_retries: 3,
            request_delay_ms: 0,
            retry_delay_ms: 0,
            retry_status_codes: vec![429, 503],
            default_content_selectors: vec!["article".to_string()],
            crawl_interval_minutes: 5,
        },
        output: OutputConfig {
            data_dir: data_dir.to_string(),
        },
        publisher: vec![PublisherConfig {
            name: "dantri".to_string(),
            start_url: format!("{}/", base_url),
            article_url_pattern: r".*-(\d{17})\.htm".to_string(),
            category_url_pattern: r".*/category/[a-z-]+\.htm".to_string(),
            content_selectors: vec!["div.singular-content".to_string()],
            category_position: 1,
            nested_breadcrumb: false,
            category_url_field: "item".to_string(),
            category_url_suffix: ".htm".to_string(),
            timestamp_pattern: r".*-(\d{17})\.htm".to_string(),
            default_utc_offset: "+07:00".to_string(),
            // Effectively disables staleness for tests with fixed dates
            freshness_window_days: 100_000,
            steady_state_depth: 2,
            shallow_archive_depth: 5,
        }],
    }
}

/// An article page with a NewsArticle block and a two-level breadcrumb
fn article_page(base_url: &str, date_published: &str) -> String {
    format!(
        r#"<html><head>
        <script type="application/ld+json">{{
            "@type": "NewsArticle",
            "headline": "Trận đấu kịch tính",
            "description": "Tóm tắt trận đấu",
            "author": [{{"name": "Phóng Viên A"}}],
            "datePublished": "{date}"
        }}</script>
        <script type="application/ld+json">{{
            "@type": "BreadcrumbList",
            "itemListElement": [
                {{"item": "{base}/"}},
                {{"item": "{base}/category/the-thao.htm"}}
            ]
        }}</script>
        </head><body>
        <div class="singular-content"><p>Nội dung bài viết.</p></div>
        </body></html>"#,
        date = date_published,
        base = base_url
    )
}

fn links_page(hrefs: &[String]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|h| format!(r#"<a href="{}">link</a>"#, h))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

fn visited_ledger(data_dir: &Path) -> String {
    std::fs::read_to_string(data_dir.join("visited_urls.txt")).unwrap_or_default()
}

#[tokio::test]
async fn test_full_crawl_discovers_and_archives_article() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let article_path = "/the-thao/tran-dau-20250411235700109.htm";

    // Home page links to a category and the article
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(links_page(&[
            format!("{}/category/the-thao.htm", base_url),
            format!("{}{}", base_url, article_path),
        ])))
        .mount(&mock_server)
        .await;

    // The category page links to the same article
    Mock::given(method("GET"))
        .and(path("/category/the-thao.htm"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(links_page(&[format!("{}{}", base_url, article_path)])),
        )
        .mount(&mock_server)
        .await;

    // The article itself must be fetched exactly once despite being linked
    // from two pages
    Mock::given(method("GET"))
        .and(path(article_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page(&base_url, "2025-04-11T23:57:00+07:00")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let config = test_config(&base_url, data_dir.path().to_str().unwrap());

    let mut engine = CrawlEngine::new(&config).expect("Failed to create engine");
    let stats = engine.crawl().await;

    assert_eq!(stats.articles_stored, 1);
    assert_eq!(stats.articles_failed, 0);

    // Archived at <publisher>/<category>/<year>/<month>/<urlTimestamp>.csv
    let csv_path = data_dir
        .path()
        .join("dantri/the-thao/2025/04/20250411235700109.csv");
    assert!(csv_path.exists(), "expected archive file at {:?}", csv_path);

    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert!(content.starts_with("URL,Title,Description,Content,PublishTime,Author,Category"));
    assert!(content.contains("Trận đấu kịch tính"));
    assert!(content.contains("Phóng Viên A"));

    // Articles land in the ledger, categories never do
    let ledger = visited_ledger(data_dir.path());
    assert!(ledger.contains(article_path));
    assert!(!ledger.contains("/category/the-thao.htm"));
}

#[tokio::test]
async fn test_visited_article_is_never_refetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let article_path = "/the-thao/cu-20250411235700109.htm";

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(links_page(&[format!("{}{}", base_url, article_path)])),
        )
        .mount(&mock_server)
        .await;

    // Already in the ledger, so zero requests are allowed
    Mock::given(method("GET"))
        .and(path(article_path))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        data_dir.path().join("visited_urls.txt"),
        format!("{}{}\n", base_url, article_path),
    )
    .unwrap();

    let config = test_config(&base_url, data_dir.path().to_str().unwrap());
    let mut engine = CrawlEngine::new(&config).expect("Failed to create engine");
    let stats = engine.crawl().await;

    assert_eq!(stats.articles_stored, 0);
}

#[tokio::test]
async fn test_item_list_page_is_rejected_but_marked_visited() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let article_path = "/su-kien/chuoi-su-kien-20250411235700109.htm";

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(links_page(&[format!("{}{}", base_url, article_path)])),
        )
        .mount(&mock_server)
        .await;

    // Article-shaped URL whose structured data declares an event list
    Mock::given(method("GET"))
        .and(path(article_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head>
            <script type="application/ld+json">{"@type":"ItemList","itemListElement":[]}</script>
            </head><body></body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let config = test_config(&base_url, data_dir.path().to_str().unwrap());
    let mut engine = CrawlEngine::new(&config).expect("Failed to create engine");
    let stats = engine.crawl().await;

    assert_eq!(stats.articles_stored, 0);
    assert_eq!(stats.articles_failed, 1);

    // No archive tree for the publisher
    assert!(!data_dir.path().join("dantri").exists());

    // Still marked visited so the next cycle skips it
    assert!(visited_ledger(data_dir.path()).contains(article_path));
}

#[tokio::test]
async fn test_offsetless_publish_time_uses_default_offset() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let article_path = "/the-thao/gio-dia-phuong-20250411235700109.htm";

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(links_page(&[format!("{}{}", base_url, article_path)])),
        )
        .mount(&mock_server)
        .await;

    // datePublished carries no UTC offset
    Mock::given(method("GET"))
        .and(path(article_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page(&base_url, "2025-04-11T23:57:00")),
        )
        .mount(&mock_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let config = test_config(&base_url, data_dir.path().to_str().unwrap());
    let mut engine = CrawlEngine::new(&config).expect("Failed to create engine");
    let stats = engine.crawl().await;

    assert_eq!(stats.articles_stored, 1);

    let csv_path = data_dir
        .path()
        .join("dantri/the-thao/2025/04/20250411235700109.csv");
    assert!(csv_path.exists());

    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert!(content.contains("2025-04-11T23:57:00+07:00"));
}

#[tokio::test]
async fn test_stale_article_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let article_path = "/the-thao/bai-cu-20200101120000000.htm";

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(links_page(&[format!("{}{}", base_url, article_path)])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(article_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page(&base_url, "2020-01-01T12:00:00+07:00")),
        )
        .mount(&mock_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&base_url, data_dir.path().to_str().unwrap());
    config.publisher[0].freshness_window_days = 30;

    let mut engine = CrawlEngine::new(&config).expect("Failed to create engine");
    let stats = engine.crawl().await;

    assert_eq!(stats.articles_stored, 0);
    assert_eq!(stats.articles_skipped_stale, 1);
    assert!(!data_dir.path().join("dantri").exists());
}

#[tokio::test]
async fn test_retryable_status_is_bounded_by_max_retries() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let article_path = "/the-thao/loi-tam-20250411235700109.htm";

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(links_page(&[format!("{}{}", base_url, article_path)])),
        )
        .mount(&mock_server)
        .await;

    // Always 503: exactly max-retries attempts, then give up
    Mock::given(method("GET"))
        .and(path(article_path))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let config = test_config(&base_url, data_dir.path().to_str().unwrap());
    let mut engine = CrawlEngine::new(&config).expect("Failed to create engine");
    let stats = engine.crawl().await;

    assert_eq!(stats.articles_stored, 0);
    assert_eq!(stats.articles_failed, 1);
}

#[tokio::test]
async fn test_non_retryable_status_fails_immediately() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let article_path = "/the-thao/khong-ton-tai-20250411235700109.htm";

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(links_page(&[format!("{}{}", base_url, article_path)])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(article_path))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let config = test_config(&base_url, data_dir.path().to_str().unwrap());
    let mut engine = CrawlEngine::new(&config).expect("Failed to create engine");
    let stats = engine.crawl().await;

    assert_eq!(stats.articles_failed, 1);
}

#[tokio::test]
async fn test_url_budget_stops_the_cycle() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(links_page(&[format!("{}/category/the-thao.htm", base_url)])),
        )
        .mount(&mock_server)
        .await;

    // Budget of one: the seed is expanded, the category never is
    Mock::given(method("GET"))
        .and(path("/category/the-thao.htm"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&base_url, data_dir.path().to_str().unwrap());
    config.settings.max_urls_per_cycle = 1;

    let mut engine = CrawlEngine::new(&config).expect("Failed to create engine");
    let stats = engine.crawl().await;

    assert_eq!(stats.urls_processed, 1);
}

#[tokio::test]
async fn test_depth_bound_prunes_deeper_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(links_page(&[format!("{}/category/the-thao.htm", base_url)])),
        )
        .mount(&mock_server)
        .await;

    // Depth bound 0: the seed at depth 0 is expanded, the category at
    // depth 1 is pruned without a fetch
    Mock::given(method("GET"))
        .and(path("/category/the-thao.htm"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&base_url, data_dir.path().to_str().unwrap());
    config.publisher[0].shallow_archive_depth = 0;
    config.publisher[0].steady_state_depth = 0;

    let mut engine = CrawlEngine::new(&config).expect("Failed to create engine");
    let stats = engine.crawl().await;

    assert_eq!(stats.max_level, 0);
    assert_eq!(stats.urls_processed, 1);
}

#[tokio::test]
async fn test_second_cycle_skips_archived_article() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let article_path = "/the-thao/tran-dau-20250411235700109.htm";

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(links_page(&[format!("{}{}", base_url, article_path)])),
        )
        .mount(&mock_server)
        .await;

    // Fetched in the first cycle only; the ledger shields the second
    Mock::given(method("GET"))
        .and(path(article_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page(&base_url, "2025-04-11T23:57:00+07:00")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let config = test_config(&base_url, data_dir.path().to_str().unwrap());

    let mut engine = CrawlEngine::new(&config).expect("Failed to create engine");
    let first = engine.crawl().await;
    assert_eq!(first.articles_stored, 1);

    // Fresh engine, same data directory, as the scheduler would produce
    // after a restart
    let mut engine = CrawlEngine::new(&config).expect("Failed to create engine");
    let second = engine.crawl().await;
    assert_eq!(second.articles_stored, 0);
}

#[tokio::test]
async fn test_offsite_links_are_ignored() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // The only outlink points at a different host
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(links_page(&[
            "https://elsewhere.example/the-thao/xa-20250411235700109.htm".to_string(),
        ])))
        .mount(&mock_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let config = test_config(&base_url, data_dir.path().to_str().unwrap());
    let mut engine = CrawlEngine::new(&config).expect("Failed to create engine");
    let stats = engine.crawl().await;

    assert_eq!(stats.urls_processed, 1);
    assert_eq!(stats.articles_stored, 0);
    assert_eq!(stats.articles_failed, 0);
}
