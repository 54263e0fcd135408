//! Full search-and-crawl runs against a mock search engine

use crate::support::{hits, html, mount_page, page, results_page};
use std::path::Path;
use sumi_harvest::config::{parse_config, Config};
use sumi_harvest::crawler::{run_harvest, CancellationController};
use sumi_harvest::storage::{read_records, CheckpointFile, VisitedStore};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(server: &MockServer, dir: &Path, regions: &[&str]) -> Config {
    let regions: Vec<String> = regions.iter().map(|r| format!("\"{}\"", r)).collect();
    parse_config(&format!(
        r#"
[search]
engine = "bing"
query = "sumi ink"
regions = [{regions}]
max-pages = 5
base-url = "{base}/search"

[crawler]
max-depth = 1
page-timeout-ms = 5000

[user-agent]
agents = ["SumiHarvestTest/1.0"]

[output]
visited-path = "{dir}/visited_urls.txt"
records-path = "{dir}/results.csv"
"#,
        regions = regions.join(", "),
        base = server.uri(),
        dir = dir.display()
    ))
    .expect("Failed to parse test config")
}

/// Search results point at /a and /b; /b links to a PDF that fails
async fn mount_site(server: &MockServer) {
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("cc", "US"))
        .respond_with(html(results_page(
            &[format!("{}/a", base), format!("{}/b", base)],
            false,
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("cc", "GB"))
        .respond_with(html(results_page(
            &[format!("{}/b", base), format!("{}/e", base)],
            false,
        )))
        .mount(server)
        .await;

    mount_page(server, "/a", page("A", &["/c"])).await;
    mount_page(server, "/b", page("B", &["/c", "/doc.pdf"])).await;
    mount_page(server, "/c", page("C", &["/deep"])).await;
    mount_page(server, "/e", page("E", &[])).await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF".to_vec(), "application/pdf"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_writes_records_and_checkpoint() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let dir = TempDir::new().unwrap();
    let base = server.uri();

    let config = create_test_config(&server, dir.path(), &["US", "GB"]);
    let controller = CancellationController::new();
    let summary = run_harvest(config, false, controller.token())
        .await
        .expect("Harvest failed");

    assert_eq!(summary.regions_searched, 2);
    assert_eq!(summary.search_results, 4);
    assert_eq!(summary.crawl.records_written, 4);
    assert_eq!(summary.crawl.pages_failed, 1);
    assert_eq!(summary.visited_total, 5);
    assert!(!summary.cancelled);

    let records = read_records(&dir.path().join("results.csv")).unwrap();
    let mut urls: Vec<String> = records.iter().map(|r| r.url.clone()).collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            format!("{}/a", base),
            format!("{}/b", base),
            format!("{}/c", base),
            format!("{}/e", base)
        ]
    );
    assert!(records.iter().all(|r| !r.content.contains("Menu")));

    let visited = CheckpointFile::new(dir.path().join("visited_urls.txt"))
        .load()
        .unwrap();
    assert_eq!(visited.len(), 5);
    assert!(visited.contains(&format!("{}/doc.pdf", base)));
    assert!(!visited.contains(&format!("{}/deep", base)));

    // Every page fetched at most once across both regions
    assert_eq!(hits(&server, "/b").await, 1);
    assert_eq!(hits(&server, "/c").await, 1);
    assert_eq!(hits(&server, "/deep").await, 0);
}

#[tokio::test]
async fn test_second_run_resumes_from_checkpoint() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let dir = TempDir::new().unwrap();

    let first = run_harvest(
        create_test_config(&server, dir.path(), &["US"]),
        false,
        CancellationController::new().token(),
    )
    .await
    .unwrap();
    assert_eq!(first.crawl.records_written, 3);

    let second = run_harvest(
        create_test_config(&server, dir.path(), &["US"]),
        false,
        CancellationController::new().token(),
    )
    .await
    .unwrap();

    assert_eq!(second.crawl.records_written, 0);
    assert_eq!(second.crawl.skipped_visited, 2);
    assert_eq!(hits(&server, "/a").await, 1);

    // Header written once, records appended once
    let records = read_records(&dir.path().join("results.csv")).unwrap();
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_fresh_run_crawls_again_and_appends() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let dir = TempDir::new().unwrap();

    for fresh in [false, true] {
        run_harvest(
            create_test_config(&server, dir.path(), &["US"]),
            fresh,
            CancellationController::new().token(),
        )
        .await
        .unwrap();
    }

    assert_eq!(hits(&server, "/a").await, 2);
    let records = read_records(&dir.path().join("results.csv")).unwrap();
    assert_eq!(records.len(), 6);
}

#[tokio::test]
async fn test_cancelled_run_still_saves_checkpoint() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let dir = TempDir::new().unwrap();

    let controller = CancellationController::new();
    controller.cancel();

    let summary = run_harvest(
        create_test_config(&server, dir.path(), &["US"]),
        false,
        controller.token(),
    )
    .await
    .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.regions_searched, 0);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(dir.path().join("visited_urls.txt").exists());
    assert_eq!(read_records(&dir.path().join("results.csv")).unwrap().len(), 0);
}
