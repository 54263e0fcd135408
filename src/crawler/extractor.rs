//! Page text extraction
//!
//! Turns raw page markup into the bounded plain text stored with each
//! crawl record.

use crate::config::{CrawlerConfig, ExtractorPreset};
use crate::markup::Document;

/// Elements that never carry page content
pub const STANDARD_REMOVED_TAGS: &[&str] = &["script", "style", "nav", "footer", "header"];

/// Standard list plus embedded frames and no-script fallbacks
pub const STRICT_REMOVED_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "iframe", "noscript",
];

pub const STANDARD_MAX_CHARS: usize = 10_000;
pub const STRICT_MAX_CHARS: usize = 5_000;

/// Normalizes markup into whitespace-collapsed, length-capped text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentExtractor {
    max_chars: usize,
    removed_tags: Vec<String>,
}

impl ContentExtractor {
    pub fn new(max_chars: usize, removed_tags: Vec<String>) -> Self {
        Self {
            max_chars,
            removed_tags,
        }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_MAX_CHARS, tag_list(STANDARD_REMOVED_TAGS))
    }

    pub fn strict() -> Self {
        Self::new(STRICT_MAX_CHARS, tag_list(STRICT_REMOVED_TAGS))
    }

    /// Builds the extractor for a crawler section: preset plus overrides
    pub fn from_config(config: &CrawlerConfig) -> Self {
        let mut extractor = match config.extractor {
            ExtractorPreset::Standard => Self::standard(),
            ExtractorPreset::Strict => Self::strict(),
        };

        if let Some(max_chars) = config.max_content_chars {
            extractor.max_chars = max_chars;
        }
        if let Some(tags) = &config.removed_tags {
            extractor.removed_tags = tags.clone();
        }

        extractor
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn removed_tags(&self) -> &[String] {
        &self.removed_tags
    }

    /// Strips non-content elements, collapses whitespace and truncates
    ///
    /// Truncation counts characters and cuts mid-word if needed.
    pub fn clean(&self, raw_markup: &str) -> String {
        let mut document = Document::parse(raw_markup);
        document.remove_elements(&self.removed_tags);

        let text = collapse_whitespace(&document.text());
        truncate_chars(text, self.max_chars)
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::standard()
    }
}

/// Replaces every run of whitespace with a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps at most `max_chars` characters
fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((byte_index, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_index);
    }
    text
}

fn tag_list(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}
