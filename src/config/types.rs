use crate::config::profile::EngineProfile;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Search engines with a built-in result-page profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    #[default]
    Bing,
    Yahoo,
}

/// Search phase configuration
///
/// Everything except `query` and `regions` falls back to the engine preset
/// when left out.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Engine preset the optional overrides below are applied to
    #[serde(default)]
    pub engine: SearchEngine,

    /// Query text sent to the engine
    pub query: String,

    /// Region or locale codes; each one is harvested separately
    pub regions: Vec<String>,

    /// Upper bound on result pages fetched per region
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    #[serde(rename = "page-size")]
    pub page_size: Option<u32>,

    #[serde(rename = "results-selector")]
    pub results_selector: Option<String>,

    #[serde(rename = "result-link-selector")]
    pub result_link_selector: Option<String>,

    #[serde(rename = "next-page-selector")]
    pub next_page_selector: Option<String>,

    #[serde(rename = "wait-timeout-ms")]
    pub wait_timeout_ms: Option<u64>,

    #[serde(rename = "delay-min-ms")]
    pub delay_min_ms: Option<u64>,

    #[serde(rename = "delay-max-ms")]
    pub delay_max_ms: Option<u64>,
}

impl SearchConfig {
    /// Resolves the engine preset with this section's overrides applied
    pub fn profile(&self) -> EngineProfile {
        let mut profile = EngineProfile::for_engine(self.engine);

        if let Some(base_url) = &self.base_url {
            profile.base_url = base_url.clone();
        }
        if let Some(page_size) = self.page_size {
            profile.page_size = page_size;
        }
        if let Some(selector) = &self.results_selector {
            profile.results_selector = selector.clone();
        }
        if let Some(selector) = &self.result_link_selector {
            profile.result_link_selector = selector.clone();
        }
        if let Some(selector) = &self.next_page_selector {
            profile.next_page_selector = selector.clone();
        }
        if let Some(ms) = self.wait_timeout_ms {
            profile.wait_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.delay_min_ms {
            profile.delay_min = Duration::from_millis(ms);
        }
        if let Some(ms) = self.delay_max_ms {
            profile.delay_max = Duration::from_millis(ms);
        }

        profile
    }
}

/// Which set of non-content elements the extractor strips
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorPreset {
    /// script, style, nav, footer, header; 10,000 characters
    #[default]
    Standard,
    /// Standard plus iframe and noscript; 5,000 characters
    Strict,
}

/// Crawl phase configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of link-hops followed from a seed URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    #[serde(default)]
    pub extractor: ExtractorPreset,

    /// Overrides the preset's content length cap (characters)
    #[serde(rename = "max-content-chars")]
    pub max_content_chars: Option<usize>,

    /// Overrides the preset's list of stripped elements
    #[serde(rename = "removed-tags")]
    pub removed_tags: Option<Vec<String>>,

    /// Element that must be present before a page counts as loaded
    #[serde(rename = "readiness-selector", default = "default_readiness_selector")]
    pub readiness_selector: String,

    #[serde(rename = "page-timeout-ms", default = "default_page_timeout_ms")]
    pub page_timeout_ms: u64,

    #[serde(rename = "delay-min-ms", default)]
    pub delay_min_ms: u64,

    #[serde(rename = "delay-max-ms", default)]
    pub delay_max_ms: u64,

    /// Pause for longer after this many seeds (0 disables)
    #[serde(rename = "seed-batch-size", default)]
    pub seed_batch_size: u32,

    #[serde(rename = "seed-pause-min-ms", default)]
    pub seed_pause_min_ms: u64,

    #[serde(rename = "seed-pause-max-ms", default)]
    pub seed_pause_max_ms: u64,

    /// Extra seed URLs crawled after the search phase
    #[serde(default)]
    pub seeds: Vec<String>,

    /// Title fragment that marks an anti-bot verification page
    #[serde(rename = "verification-marker")]
    pub verification_marker: Option<String>,
}

impl CrawlerConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            extractor: ExtractorPreset::default(),
            max_content_chars: None,
            removed_tags: None,
            readiness_selector: default_readiness_selector(),
            page_timeout_ms: default_page_timeout_ms(),
            delay_min_ms: 0,
            delay_max_ms: 0,
            seed_batch_size: 0,
            seed_pause_min_ms: 0,
            seed_pause_max_ms: 0,
            seeds: Vec::new(),
            verification_marker: None,
        }
    }
}

/// User agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Agent strings; the first one is used when rotation is off
    #[serde(default = "default_agents")]
    pub agents: Vec<String>,

    /// Pick a random agent before every fetch
    #[serde(default)]
    pub rotate: bool,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            agents: default_agents(),
            rotate: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the visited-URL checkpoint file
    #[serde(rename = "visited-path", default = "default_visited_path")]
    pub visited_path: String,

    /// Path to the CSV record store
    #[serde(rename = "records-path", default = "default_records_path")]
    pub records_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            visited_path: default_visited_path(),
            records_path: default_records_path(),
        }
    }
}

fn default_max_pages() -> u32 {
    1000
}

fn default_max_depth() -> u32 {
    1
}

fn default_readiness_selector() -> String {
    "body".to_string()
}

fn default_page_timeout_ms() -> u64 {
    20_000
}

fn default_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36".to_string(),
    ]
}

fn default_visited_path() -> String {
    "visited_urls.txt".to_string()
}

fn default_records_path() -> String {
    "results.csv".to_string()
}
