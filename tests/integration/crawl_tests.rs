//! Crawl engine over HTTP
//!
//! These tests use wiremock to serve small link graphs and check depth
//! bounds, deduplication and failure handling end-to-end.

use crate::support::{driver, hits, mount_page, page};
use std::time::Duration;
use sumi_harvest::crawler::{ContentExtractor, CrawlEngine, CrawlSettings, Pacing};
use sumi_harvest::driver::Readiness;
use sumi_harvest::storage::{CrawlRecord, VisitedSet};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(max_depth: u32) -> CrawlSettings {
    CrawlSettings {
        max_depth,
        readiness: Readiness::ElementPresent("body".to_string()),
        page_timeout: Duration::from_secs(5),
        verification_marker: None,
    }
}

/// a -> b, c; b -> d; c -> d
async fn mount_diamond(server: &MockServer) {
    let base = server.uri();
    mount_page(server, "/a", page("A", &["/b", &format!("{}/c", base)])).await;
    mount_page(server, "/b", page("B", &["d"])).await;
    mount_page(server, "/c", page("C", &["/d#section"])).await;
    mount_page(server, "/d", page("D", &["/a", "mailto:ink@example.com"])).await;
}

async fn crawl(
    server: &MockServer,
    max_depth: u32,
    visited: &mut VisitedSet,
) -> Vec<CrawlRecord> {
    let mut driver = driver();
    let mut records: Vec<CrawlRecord> = Vec::new();
    let cancel = CancellationToken::new();

    CrawlEngine::new(
        &mut driver,
        &mut records,
        ContentExtractor::standard(),
        settings(max_depth),
        Pacing::unpaced(),
    )
    .crawl(&format!("{}/a", server.uri()), visited, &cancel)
    .await
    .expect("Crawl failed");

    records
}

#[tokio::test]
async fn test_diamond_crawled_once_per_page() {
    let server = MockServer::start().await;
    mount_diamond(&server).await;

    let mut visited = VisitedSet::new();
    let records = crawl(&server, 2, &mut visited).await;

    let base = server.uri();
    let mut urls: Vec<String> = records.iter().map(|r| r.url.clone()).collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            format!("{}/a", base),
            format!("{}/b", base),
            format!("{}/c", base),
            format!("{}/d", base)
        ]
    );
    assert_eq!(visited.len(), 4);
    assert_eq!(hits(&server, "/d").await, 1);
    assert_eq!(hits(&server, "/a").await, 1);
}

#[tokio::test]
async fn test_depth_limit_stops_expansion() {
    let server = MockServer::start().await;
    mount_diamond(&server).await;

    let mut visited = VisitedSet::new();
    let records = crawl(&server, 1, &mut visited).await;

    assert_eq!(records.len(), 3);
    assert_eq!(hits(&server, "/d").await, 0);
}

#[tokio::test]
async fn test_records_carry_cleaned_text() {
    let server = MockServer::start().await;
    mount_diamond(&server).await;

    let mut visited = VisitedSet::new();
    let records = crawl(&server, 0, &mut visited).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "A");
    assert_eq!(records[0].content, "A Content of A link link");
    assert!(!records[0].content.contains("Menu"));
}

#[tokio::test]
async fn test_non_html_and_missing_pages_are_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/a", page("A", &["/report.pdf", "/gone", "/b"])).await;
    mount_page(&server, "/b", page("B", &[])).await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .mount(&server)
        .await;

    let mut visited = VisitedSet::new();
    let records = crawl(&server, 1, &mut visited).await;

    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec![format!("{}/a", base), format!("{}/b", base)]);

    // Failed pages are still marked visited
    assert!(visited.contains(&format!("{}/report.pdf", base)));
    assert!(visited.contains(&format!("{}/gone", base)));
}

#[tokio::test]
async fn test_previously_visited_pages_are_not_fetched() {
    let server = MockServer::start().await;
    mount_diamond(&server).await;

    let mut visited: VisitedSet = [format!("{}/b", server.uri())].into_iter().collect();
    let records = crawl(&server, 2, &mut visited).await;

    assert_eq!(hits(&server, "/b").await, 0);
    // d is still reached through c
    assert_eq!(records.len(), 3);
}
