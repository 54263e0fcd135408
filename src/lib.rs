//! Sumi-Harvest: a resumable search-and-crawl harvester
//!
//! This crate collects result links from a web search engine, follows the
//! outbound links of every result to a bounded depth, and appends the
//! cleaned text of each page to a CSV store. A checkpoint of visited URLs
//! lets an interrupted run resume where it stopped.

pub mod config;
pub mod crawler;
pub mod driver;
pub mod markup;
pub mod storage;

use thiserror::Error;

/// Fatal errors for a harvest run
///
/// Per-page and per-results-page failures are reported as
/// [`driver::DriverError`] and handled where they occur; only errors that
/// make the whole run meaningless surface here.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page driver failed to start: {0}")]
    DriverInit(#[source] driver::DriverError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CancellationController, ContentExtractor, CrawlEngine, SearchHarvester};
pub use driver::{DriverError, HttpPageDriver, PageDriver, Readiness};
pub use storage::{CrawlRecord, CsvRecordStore, RecordSink, VisitedSet, VisitedStore};
