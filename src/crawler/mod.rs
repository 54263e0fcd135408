//! Crawler module for search harvesting and page crawling
//!
//! This module contains the core run logic, including:
//! - Paginated harvesting of search result URLs
//! - Depth-bounded crawling with run-wide deduplication
//! - Page text extraction
//! - Request pacing and cooperative cancellation
//! - Overall run coordination

mod cancel;
mod coordinator;
mod engine;
mod extractor;
mod harvester;
mod pacing;

pub use cancel::CancellationController;
pub use coordinator::{run_harvest, Coordinator, RunSummary};
pub use engine::{CrawlEngine, CrawlReport, CrawlSettings};
pub use extractor::{
    collapse_whitespace, ContentExtractor, STANDARD_MAX_CHARS, STANDARD_REMOVED_TAGS,
    STRICT_MAX_CHARS, STRICT_REMOVED_TAGS,
};
pub use harvester::{HarvestOutcome, HarvestStop, SearchHarvester, SearchResultSet};
pub use pacing::{DelayPolicy, Pacing, UserAgentRotation};
