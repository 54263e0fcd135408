//! Search-result harvesting
//!
//! Walks the paginated result pages of one query in one region and
//! collects the absolute result URLs they list. Pagination ends at the
//! page limit, when a page has no next-page control, or on the first page
//! that fails; none of these are errors.

use crate::config::EngineProfile;
use crate::crawler::pacing::Pacing;
use crate::driver::{PageDriver, Readiness};
use crate::markup::{absolute_http_url, Document};
use std::collections::HashSet;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Unique result URLs in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResultSet {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl SearchResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL; returns false if it was already present
    pub fn insert(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

/// Why pagination stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestStop {
    Cancelled,
    PageLimit,
    NoNextPage,
    /// The results container never appeared
    ResultsTimeout,
    FetchFailed,
    /// The engine served a verification page
    Blocked,
}

impl fmt::Display for HarvestStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Cancelled => "cancelled",
            Self::PageLimit => "page limit reached",
            Self::NoNextPage => "no next page",
            Self::ResultsTimeout => "results did not load",
            Self::FetchFailed => "results page failed",
            Self::Blocked => "verification page",
        };
        f.write_str(reason)
    }
}

/// Result of harvesting one region
#[derive(Debug, Clone)]
pub struct HarvestOutcome {
    pub results: SearchResultSet,
    /// Result pages a navigation was attempted for
    pub pages_fetched: u32,
    pub stop: HarvestStop,
}

/// Collects result URLs for a query through a page driver
pub struct SearchHarvester<'a, D: PageDriver> {
    driver: &'a mut D,
    profile: EngineProfile,
    max_pages: u32,
    pacing: Pacing,
}

impl<'a, D: PageDriver> SearchHarvester<'a, D> {
    pub fn new(driver: &'a mut D, profile: EngineProfile, max_pages: u32, pacing: Pacing) -> Self {
        Self {
            driver,
            profile,
            max_pages,
            pacing,
        }
    }

    /// Harvests result URLs for `query` in `region`
    ///
    /// Never fails: a page that cannot be loaded ends pagination and the
    /// URLs gathered so far are returned.
    pub async fn harvest(
        &mut self,
        query: &str,
        region: &str,
        cancel: &CancellationToken,
    ) -> HarvestOutcome {
        let readiness = Readiness::ElementPresent(self.profile.results_selector.clone());
        let mut results = SearchResultSet::new();
        let mut pages_fetched = 0;

        let stop = loop {
            if cancel.is_cancelled() {
                break HarvestStop::Cancelled;
            }
            if pages_fetched >= self.max_pages {
                break HarvestStop::PageLimit;
            }

            self.pacing.pause(cancel).await;
            if cancel.is_cancelled() {
                break HarvestStop::Cancelled;
            }

            let page_index = pages_fetched;
            pages_fetched += 1;

            match self
                .fetch_results_page(query, region, page_index, &readiness, &mut results)
                .await
            {
                Ok(true) => continue,
                Ok(false) => break HarvestStop::NoNextPage,
                Err(stop) => break stop,
            }
        };

        tracing::debug!(
            "Region {}: stopped after {} pages ({})",
            region,
            pages_fetched,
            stop
        );

        HarvestOutcome {
            results,
            pages_fetched,
            stop,
        }
    }

    /// Loads one results page and records its links
    ///
    /// Returns whether a next page exists.
    async fn fetch_results_page(
        &mut self,
        query: &str,
        region: &str,
        page_index: u32,
        readiness: &Readiness,
        results: &mut SearchResultSet,
    ) -> Result<bool, HarvestStop> {
        let url = self
            .profile
            .page_url(query, region, page_index)
            .map_err(|e| {
                tracing::warn!("Cannot build results URL for region {}: {}", region, e);
                HarvestStop::FetchFailed
            })?;

        if let Err(e) = self.pacing.rotate_agent(&mut *self.driver).await {
            tracing::warn!("Failed to set user agent: {}", e);
        }

        if let Err(e) = self.driver.navigate(url.as_str()).await {
            tracing::warn!(
                "Search request failed for region {} page {}: {}",
                region,
                page_index + 1,
                e
            );
            return Err(HarvestStop::FetchFailed);
        }

        if let Some(marker) = &self.profile.verification_marker {
            let title = self.driver.title().await.unwrap_or_default();
            if title.contains(marker.as_str()) {
                tracing::warn!(
                    "Verification page served for region {}, stopping pagination",
                    region
                );
                return Err(HarvestStop::Blocked);
            }
        }

        match self.driver.wait_for(readiness, self.profile.wait_timeout).await {
            Ok(()) => {}
            Err(e) if e.is_timeout() => {
                tracing::info!(
                    "Region {} page {}: no results container, ending pagination",
                    region,
                    page_index + 1
                );
                return Err(HarvestStop::ResultsTimeout);
            }
            Err(e) => {
                tracing::warn!("Results page for region {} unusable: {}", region, e);
                return Err(HarvestStop::FetchFailed);
            }
        }

        let markup = self.driver.markup().await.map_err(|e| {
            tracing::warn!("Failed to read results page for region {}: {}", region, e);
            HarvestStop::FetchFailed
        })?;

        let (hrefs, has_next) = self.scan_results(&markup).map_err(|e| {
            tracing::warn!("Failed to scan results page: {}", e);
            HarvestStop::FetchFailed
        })?;

        let mut found = 0;
        for href in hrefs {
            match absolute_http_url(&href) {
                Some(url) => {
                    found += 1;
                    results.insert(url);
                }
                None => tracing::trace!("Skipping non-absolute result link {}", href),
            }
        }

        tracing::info!(
            "Region {} page {}: {} results",
            region,
            page_index + 1,
            found
        );

        Ok(has_next)
    }

    /// Result hrefs in document order and whether a next-page control exists
    fn scan_results(&self, markup: &str) -> crate::markup::MarkupResult<(Vec<String>, bool)> {
        let document = Document::parse(markup);
        let hrefs = document.attr_values(&self.profile.result_link_selector, "href")?;
        let has_next = document.contains(&self.profile.next_page_selector)?;
        Ok((hrefs, has_next))
    }
}
