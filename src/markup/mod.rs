//! Markup parsing for search result pages and crawled pages
//!
//! This module provides:
//! - Document parsing and CSS selection
//! - Removal of non-content elements
//! - Visible text and title extraction
//! - Hyperlink enumeration and resolution

mod document;
mod links;

pub use document::{parse_selector, Document, MarkupError, MarkupResult};
pub use links::{absolute_http_url, resolve_link, Hyperlink};
