//! Depth-bounded crawl from a seed URL
//!
//! The crawl is a depth-first walk over an explicit work list of
//! `(url, depth)` pairs, where depth counts link-hops from the seed. A page
//! at depth `d` is recorded when `d <= max_depth` and its links are
//! followed only when `d < max_depth`. Each URL is added to the visited set
//! before it is fetched, so no URL is fetched twice across the whole run.

use crate::config::CrawlerConfig;
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::pacing::Pacing;
use crate::driver::{DriverError, DriverResult, PageDriver, Readiness};
use crate::markup::{absolute_http_url, resolve_link};
use crate::storage::{CrawlRecord, RecordSink, StorageError, VisitedSet};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Per-page crawl parameters
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub max_depth: u32,
    pub readiness: Readiness,
    pub page_timeout: Duration,
    /// Title fragment that marks an anti-bot verification page
    pub verification_marker: Option<String>,
}

impl CrawlSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            readiness: Readiness::ElementPresent(config.readiness_selector.clone()),
            page_timeout: config.page_timeout(),
            verification_marker: config.verification_marker.clone(),
        }
    }
}

/// What a crawl did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub records_written: u64,
    pub pages_failed: u64,
    /// Work items dropped because the URL was already visited
    pub skipped_visited: u64,
    pub cancelled: bool,
    /// A verification page was served and the crawl stopped
    pub blocked: bool,
}

impl CrawlReport {
    /// Adds another report's counts into this one
    pub fn absorb(&mut self, other: &CrawlReport) {
        self.records_written += other.records_written;
        self.pages_failed += other.pages_failed;
        self.skipped_visited += other.skipped_visited;
        self.cancelled |= other.cancelled;
        self.blocked |= other.blocked;
    }
}

/// Crawls pages through a driver and appends a record per page to a sink
pub struct CrawlEngine<'a, D: PageDriver, S: RecordSink> {
    driver: &'a mut D,
    sink: &'a mut S,
    extractor: ContentExtractor,
    settings: CrawlSettings,
    pacing: Pacing,
}

impl<'a, D: PageDriver, S: RecordSink> CrawlEngine<'a, D, S> {
    pub fn new(
        driver: &'a mut D,
        sink: &'a mut S,
        extractor: ContentExtractor,
        settings: CrawlSettings,
        pacing: Pacing,
    ) -> Self {
        Self {
            driver,
            sink,
            extractor,
            settings,
            pacing,
        }
    }

    /// Crawls everything reachable from `seed` within the depth bound
    ///
    /// Page failures are logged and counted. The only error returned is a
    /// failed record append, which makes the rest of the run pointless.
    pub async fn crawl(
        &mut self,
        seed: &str,
        visited: &mut VisitedSet,
        cancel: &CancellationToken,
    ) -> Result<CrawlReport, StorageError> {
        let mut report = CrawlReport::default();
        // Same form as resolved links so a seed and a link to it dedupe
        let seed = absolute_http_url(seed).unwrap_or_else(|| seed.to_string());
        let mut work: Vec<(String, u32)> = vec![(seed, 0)];

        while let Some((url, depth)) = work.pop() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            if visited.contains(&url) {
                report.skipped_visited += 1;
                continue;
            }
            if depth > self.settings.max_depth {
                continue;
            }

            self.pacing.pause(cancel).await;
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            tracing::info!("Crawling [depth {}]: {}", depth, url);
            visited.insert(url.clone());

            let record = match self.fetch_record(&url).await {
                Ok(record) => record,
                Err(DriverError::Blocked { .. }) => {
                    tracing::warn!("Verification page served for {}, stopping crawl", url);
                    report.pages_failed += 1;
                    report.blocked = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("Failed to crawl {}: {}", url, e);
                    report.pages_failed += 1;
                    continue;
                }
            };

            self.sink.append(&record)?;
            report.records_written += 1;

            if depth >= self.settings.max_depth {
                continue;
            }

            match self.child_links(&url).await {
                Ok(links) => {
                    let children: Vec<String> = links
                        .into_iter()
                        .filter(|link| !visited.contains(link))
                        .collect();
                    tracing::debug!("Found {} unvisited links on {}", children.len(), url);

                    // Reversed so the first link in the document is popped first
                    for child in children.into_iter().rev() {
                        work.push((child, depth + 1));
                    }
                }
                Err(e) => tracing::warn!("Failed to read links from {}: {}", url, e),
            }
        }

        Ok(report)
    }

    /// Loads a page and turns it into a record
    async fn fetch_record(&mut self, url: &str) -> DriverResult<CrawlRecord> {
        if let Err(e) = self.pacing.rotate_agent(&mut *self.driver).await {
            tracing::warn!("Failed to set user agent: {}", e);
        }

        self.driver.navigate(url).await?;
        self.driver
            .wait_for(&self.settings.readiness, self.settings.page_timeout)
            .await?;

        let title = self.driver.title().await?;
        if let Some(marker) = &self.settings.verification_marker {
            if title.contains(marker.as_str()) {
                return Err(DriverError::Blocked {
                    url: url.to_string(),
                });
            }
        }

        let markup = self.driver.markup().await?;
        Ok(CrawlRecord {
            title,
            url: url.to_string(),
            content: self.extractor.clean(&markup),
        })
    }

    /// Absolute http(s) links of the current page in document order
    async fn child_links(&mut self, requested_url: &str) -> DriverResult<Vec<String>> {
        let page_url = self.driver.current_url().unwrap_or(requested_url);
        let base = Url::parse(page_url).map_err(|e| DriverError::Navigation {
            url: page_url.to_string(),
            message: e.to_string(),
        })?;

        let links = self.driver.hyperlinks().await?;
        Ok(links
            .into_iter()
            .filter_map(|link| resolve_link(&link.href, &base).or(link.resolved))
            .collect())
    }
}
