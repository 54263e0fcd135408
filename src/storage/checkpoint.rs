//! Plain-text checkpoint of visited URLs
//!
//! One absolute URL per line, UTF-8, no header. Saving always rewrites the
//! whole file.

use crate::storage::traits::{StorageResult, VisitedStore};
use crate::storage::VisitedSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Visited-URL checkpoint stored in a text file
#[derive(Debug, Clone)]
pub struct CheckpointFile {
    path: PathBuf,
}

impl CheckpointFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the new checkpoint is written to before the rename
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl VisitedStore for CheckpointFile {
    fn load(&self) -> StorageResult<VisitedSet> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(VisitedSet::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn save(&self, visited: &VisitedSet) -> StorageResult<()> {
        let mut urls: Vec<&str> = visited.iter().map(String::as_str).collect();
        urls.sort_unstable();

        let mut content = urls.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }

        // A crash mid-write leaves the previous checkpoint intact
        let staging = self.staging_path();
        fs::write(&staging, content)?;
        fs::rename(&staging, &self.path)?;

        tracing::debug!(
            "Saved {} visited URLs to {}",
            visited.len(),
            self.path.display()
        );
        Ok(())
    }
}
