//! CSV record store
//!
//! The store has a fixed `title,url,content` header written when the file
//! is first created. Every append is flushed before returning so a crash
//! loses at most the page being processed.

use crate::storage::traits::{RecordSink, StorageResult};
use crate::storage::CrawlRecord;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Column names of the record store
pub const RECORD_HEADER: [&str; 3] = ["title", "url", "content"];

/// Append-only CSV file of crawl records
pub struct CsvRecordStore {
    path: PathBuf,
    writer: csv::Writer<File>,
    appended: u64,
}

impl CsvRecordStore {
    /// Opens the store for appending, creating it with a header if needed
    ///
    /// An existing empty file is treated as new and receives the header.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let has_content = path
            .metadata()
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if !has_content {
            writer.write_record(RECORD_HEADER)?;
            writer.flush()?;
            tracing::info!("Created record store at {}", path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            appended: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records appended through this handle
    pub fn appended(&self) -> u64 {
        self.appended
    }
}

impl RecordSink for CsvRecordStore {
    fn append(&mut self, record: &CrawlRecord) -> StorageResult<()> {
        self.writer.write_record([
            record.title.as_str(),
            record.url.as_str(),
            record.content.as_str(),
        ])?;
        self.writer.flush()?;
        self.appended += 1;
        Ok(())
    }
}

/// Reads every record from a CSV store
pub fn read_records(path: &Path) -> StorageResult<Vec<CrawlRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}
