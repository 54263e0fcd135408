//! Page driver trait and error types
//!
//! The harvester and crawl engine only talk to pages through this trait, so
//! they work the same over plain HTTP, a headless browser, or a scripted
//! test double.

use crate::markup::{Hyperlink, MarkupError};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Recoverable failure of one page operation
///
/// None of these end a run: callers log them and either skip the page or
/// stop paginating.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Timed out after {waited:?} waiting for {condition}")]
    Timeout { condition: String, waited: Duration },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Verification page served for {url}")]
    Blocked { url: String },

    #[error("No page has been loaded")]
    NoPage,

    #[error("Invalid readiness condition: {0}")]
    Condition(#[from] MarkupError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl DriverError {
    /// Returns true if the failure was a readiness or response timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type for page driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Condition a loaded page must meet before its markup is used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Usable as soon as navigation completes
    Immediate,

    /// Usable once an element matching the CSS selector exists
    ElementPresent(String),
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => write!(f, "page load"),
            Self::ElementPresent(selector) => write!(f, "element '{}'", selector),
        }
    }
}

/// A session that loads one page at a time
///
/// Implementations hold whatever long-lived resource backs the session
/// (HTTP connection pool, browser process). It is acquired when the driver
/// is built and must be released with [`PageDriver::close`].
#[async_trait]
pub trait PageDriver: Send {
    /// Loads a URL, replacing the current page
    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// Waits at most `timeout` for the current page to satisfy `condition`
    async fn wait_for(&mut self, condition: &Readiness, timeout: Duration) -> DriverResult<()>;

    /// Returns the current page's markup
    async fn markup(&mut self) -> DriverResult<String>;

    /// Lists the current page's hyperlinks in document order
    async fn hyperlinks(&mut self) -> DriverResult<Vec<Hyperlink>>;

    /// Returns the current page's title, empty if it has none
    async fn title(&mut self) -> DriverResult<String>;

    /// URL of the current page after redirects
    fn current_url(&self) -> Option<&str>;

    /// Sets the user agent for subsequent navigations
    async fn set_user_agent(&mut self, user_agent: &str) -> DriverResult<()>;

    /// Releases the session; later navigations fail
    async fn close(&mut self) -> DriverResult<()>;
}
