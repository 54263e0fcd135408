//! Search engine result-page profiles
//!
//! A profile captures everything the harvester needs to know about one
//! engine: how to build a paginated request and where results live in the
//! returned markup.

use crate::config::types::SearchEngine;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Failure to build a results-page URL
#[derive(Debug, Error)]
pub enum PageUrlError {
    #[error("result offset for page {page_index} does not fit in u32")]
    OffsetOverflow { page_index: u32 },

    #[error("invalid search URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Request and markup layout of one search engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineProfile {
    /// Search endpoint without query string
    pub base_url: String,

    /// Parameter carrying the query text
    pub query_param: String,

    /// Parameter carrying the result offset
    pub offset_param: String,

    /// Offset of the first result on page 0
    pub offset_base: u32,

    /// Results per page
    pub page_size: u32,

    /// Parameter carrying the region code
    pub region_param: String,

    /// Prepended to the region code (e.g. `lang_` for Yahoo)
    pub region_prefix: String,

    /// Parameters sent verbatim with every request
    pub extra_params: Vec<(String, String)>,

    /// Element whose presence means results have rendered
    pub results_selector: String,

    /// Anchors holding result links
    pub result_link_selector: String,

    /// Element whose presence means another page exists
    pub next_page_selector: String,

    /// Bound on waiting for the results container
    pub wait_timeout: Duration,

    pub delay_min: Duration,
    pub delay_max: Duration,

    /// Title fragment of the engine's anti-bot interstitial
    pub verification_marker: Option<String>,
}

impl EngineProfile {
    pub fn for_engine(engine: SearchEngine) -> Self {
        match engine {
            SearchEngine::Bing => Self::bing(),
            SearchEngine::Yahoo => Self::yahoo(),
        }
    }

    pub fn bing() -> Self {
        Self {
            base_url: "https://www.bing.com/search".to_string(),
            query_param: "q".to_string(),
            offset_param: "first".to_string(),
            offset_base: 1,
            page_size: 10,
            region_param: "cc".to_string(),
            region_prefix: String::new(),
            extra_params: Vec::new(),
            results_selector: "ol#b_results".to_string(),
            result_link_selector: "li.b_algo h2 a".to_string(),
            next_page_selector: "a.sb_pagN".to_string(),
            wait_timeout: Duration::from_secs(15),
            delay_min: Duration::ZERO,
            delay_max: Duration::ZERO,
            verification_marker: None,
        }
    }

    pub fn yahoo() -> Self {
        let extra_params = [
            ("geo", "HK"),
            ("country", "HK"),
            ("fr2", "sa"),
            ("vlng", "zh-Hant-HK"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            base_url: "https://hk.search.yahoo.com/search".to_string(),
            query_param: "p".to_string(),
            offset_param: "b".to_string(),
            offset_base: 1,
            page_size: 10,
            region_param: "vl".to_string(),
            region_prefix: "lang_".to_string(),
            extra_params,
            results_selector: "div#web li".to_string(),
            result_link_selector: "div#web li h3 a".to_string(),
            next_page_selector: "a.next".to_string(),
            wait_timeout: Duration::from_secs(20),
            delay_min: Duration::from_secs(3),
            delay_max: Duration::from_secs(7),
            verification_marker: Some("Verification".to_string()),
        }
    }

    /// Offset of the first result on the given zero-based page
    ///
    /// Returns `None` when the offset does not fit in a `u32`.
    pub fn offset(&self, page_index: u32) -> Option<u32> {
        page_index
            .checked_mul(self.page_size)?
            .checked_add(self.offset_base)
    }

    /// Builds the request URL for one results page
    pub fn page_url(
        &self,
        query: &str,
        region: &str,
        page_index: u32,
    ) -> Result<Url, PageUrlError> {
        let offset = self
            .offset(page_index)
            .ok_or(PageUrlError::OffsetOverflow { page_index })?
            .to_string();
        let region_value = format!("{}{}", self.region_prefix, region);

        let mut params: Vec<(&str, &str)> = vec![
            (self.query_param.as_str(), query),
            (self.offset_param.as_str(), offset.as_str()),
            (self.region_param.as_str(), region_value.as_str()),
        ];
        params.extend(
            self.extra_params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );

        Ok(Url::parse_with_params(&self.base_url, params)?)
    }
}
