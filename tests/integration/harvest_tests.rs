//! Search harvesting over HTTP

use crate::support::{driver, html, results_page};
use sumi_harvest::config::EngineProfile;
use sumi_harvest::crawler::{HarvestStop, Pacing, SearchHarvester};
use sumi_harvest::driver::PageDriver;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn profile(server: &MockServer) -> EngineProfile {
    let mut profile = EngineProfile::bing();
    profile.base_url = format!("{}/search", server.uri());
    profile
}

async fn mount_results(server: &MockServer, first: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "ink wash"))
        .and(query_param("cc", "US"))
        .and(query_param("first", first))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_paginates_across_result_pages() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_results(
        &server,
        "1",
        results_page(&[format!("{}/one", base), "/relative".to_string()], true),
    )
    .await;
    mount_results(
        &server,
        "11",
        results_page(&[format!("{}/two", base), format!("{}/one", base)], true),
    )
    .await;
    mount_results(&server, "21", results_page(&[format!("{}/three", base)], false)).await;

    let mut driver = driver();
    let cancel = CancellationToken::new();
    let outcome = SearchHarvester::new(&mut driver, profile(&server), 50, Pacing::unpaced())
        .harvest("ink wash", "US", &cancel)
        .await;

    assert_eq!(outcome.stop, HarvestStop::NoNextPage);
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(
        outcome.results.into_urls(),
        vec![
            format!("{}/one", base),
            format!("{}/two", base),
            format!("{}/three", base)
        ]
    );
}

#[tokio::test]
async fn test_page_limit_stops_pagination() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_results(&server, "1", results_page(&[format!("{}/one", base)], true)).await;
    mount_results(&server, "11", results_page(&[format!("{}/two", base)], true)).await;

    let mut driver = driver();
    let cancel = CancellationToken::new();
    let outcome = SearchHarvester::new(&mut driver, profile(&server), 1, Pacing::unpaced())
        .harvest("ink wash", "US", &cancel)
        .await;

    assert_eq!(outcome.stop, HarvestStop::PageLimit);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_page_without_results_ends_harvest() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_results(&server, "1", results_page(&[format!("{}/one", base)], true)).await;
    mount_results(
        &server,
        "11",
        "<html><body><p>There are no results for ink wash</p></body></html>".to_string(),
    )
    .await;

    let mut driver = driver();
    let cancel = CancellationToken::new();
    let outcome = SearchHarvester::new(&mut driver, profile(&server), 50, Pacing::unpaced())
        .harvest("ink wash", "US", &cancel)
        .await;

    assert_eq!(outcome.stop, HarvestStop::ResultsTimeout);
    assert_eq!(outcome.results.into_urls(), vec![format!("{}/one", base)]);
}

#[tokio::test]
async fn test_server_error_keeps_collected_results() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_results(&server, "1", results_page(&[format!("{}/one", base)], true)).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("first", "11"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut driver = driver();
    let cancel = CancellationToken::new();
    let outcome = SearchHarvester::new(&mut driver, profile(&server), 50, Pacing::unpaced())
        .harvest("ink wash", "US", &cancel)
        .await;

    assert_eq!(outcome.stop, HarvestStop::FetchFailed);
    assert_eq!(outcome.results.len(), 1);
}

#[tokio::test]
async fn test_sends_configured_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("user-agent", "ProbeAgent/2.0"))
        .respond_with(html(results_page(&[], false)))
        .expect(1)
        .mount(&server)
        .await;

    let mut driver = driver();
    driver.set_user_agent("ProbeAgent/2.0").await.unwrap();

    let cancel = CancellationToken::new();
    let outcome = SearchHarvester::new(&mut driver, profile(&server), 5, Pacing::unpaced())
        .harvest("ink wash", "US", &cancel)
        .await;

    assert_eq!(outcome.stop, HarvestStop::NoNextPage);
    assert!(outcome.results.is_empty());
}
