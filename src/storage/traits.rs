//! Storage traits and error types
//!
//! This module defines the trait interface for the two persistent stores
//! and their shared error type.

use crate::storage::{CrawlRecord, VisitedSet};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persists the set of visited URLs between runs
pub trait VisitedStore {
    /// Loads the set saved by earlier runs
    ///
    /// Returns an empty set when nothing has been saved yet.
    fn load(&self) -> StorageResult<VisitedSet>;

    /// Replaces the saved set with `visited`
    fn save(&self, visited: &VisitedSet) -> StorageResult<()>;
}

/// Append-only destination for crawl records
pub trait RecordSink {
    /// Appends one record; it must be durable when this returns
    fn append(&mut self, record: &CrawlRecord) -> StorageResult<()>;
}

impl RecordSink for Vec<CrawlRecord> {
    fn append(&mut self, record: &CrawlRecord) -> StorageResult<()> {
        self.push(record.clone());
        Ok(())
    }
}
