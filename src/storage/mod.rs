//! Storage module for persisting harvest state
//!
//! This module handles the two files a run leaves behind:
//! - The visited-URL checkpoint that lets an interrupted run resume
//! - The append-only CSV store of crawl records

mod checkpoint;
mod csv_store;
mod traits;

pub use checkpoint::CheckpointFile;
pub use csv_store::{read_records, CsvRecordStore, RECORD_HEADER};
pub use traits::{RecordSink, StorageError, StorageResult, VisitedStore};

use serde::Deserialize;
use std::collections::HashSet;

/// Absolute URLs already crawled, across this and earlier runs
///
/// URLs are only ever added during a run.
pub type VisitedSet = HashSet<String>;

/// One successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CrawlRecord {
    pub title: String,
    pub url: String,
    /// Cleaned page text, already truncated to the content cap
    pub content: String,
}
