//! Shared helpers for the integration tests

use std::time::Duration;
use sumi_harvest::driver::HttpPageDriver;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_AGENT: &str = "SumiHarvestTest/1.0";

/// A 200 response carrying HTML
pub fn html(body: impl Into<String>) -> ResponseTemplate {
    let body: String = body.into();
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

/// A simple page with a title, one paragraph and the given links
pub fn page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><nav>Menu</nav><p>Content of {}</p>{}</body></html>",
        title, title, anchors
    )
}

/// A Bing-layout results page
pub fn results_page(links: &[String], has_next: bool) -> String {
    let items: String = links
        .iter()
        .map(|href| {
            format!(
                r#"<li class="b_algo"><h2><a href="{}">result</a></h2><p>snippet</p></li>"#,
                href
            )
        })
        .collect();
    let next = if has_next {
        r#"<a class="sb_pagN" href="/search?next">Next</a>"#
    } else {
        ""
    };
    format!(
        r#"<html><head><title>ink - Search</title></head><body><ol id="b_results">{}</ol>{}</body></html>"#,
        items, next
    )
}

/// Serves `body` as HTML at `route`
pub async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

pub fn driver() -> HttpPageDriver {
    HttpPageDriver::new(TEST_AGENT, Duration::from_secs(5)).expect("Failed to build driver")
}

/// Number of requests the server received for `route`
pub async fn hits(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == route)
        .count()
}
