//! HTTP page driver
//!
//! This module loads pages with a plain HTTP client. It handles:
//! - Building the client with timeouts, compression and redirect limits
//! - Per-request user agent selection
//! - Status and Content-Type classification
//! - Readiness checks against the fetched markup

use crate::driver::traits::{DriverError, DriverResult, PageDriver, Readiness};
use crate::markup::{Document, Hyperlink};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Hard ceiling on a single request, independent of the navigation timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// The page most recently loaded by the driver
#[derive(Debug)]
struct LoadedPage {
    /// Final URL after redirects
    url: Url,
    body: String,
}

/// Page driver backed by a pooled HTTP client
///
/// Pages are static once fetched, so a readiness condition is evaluated
/// once against the markup; the time bound is enforced on the request.
pub struct HttpPageDriver {
    client: Client,
    user_agent: String,
    navigation_timeout: Duration,
    page: Option<LoadedPage>,
    closed: bool,
}

/// Builds an HTTP client with the crawler's connection settings
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::driver::build_http_client;
///
/// let client = build_http_client().unwrap();
/// ```
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(CLIENT_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

impl HttpPageDriver {
    /// Creates a driver, failing if the HTTP client cannot be built
    ///
    /// # Arguments
    ///
    /// * `user_agent` - Initial user agent string
    /// * `navigation_timeout` - Bound on a whole request, body included
    pub fn new(user_agent: impl Into<String>, navigation_timeout: Duration) -> DriverResult<Self> {
        Ok(Self {
            client: build_http_client()?,
            user_agent: user_agent.into(),
            navigation_timeout,
            page: None,
            closed: false,
        })
    }

    fn page(&self) -> DriverResult<&LoadedPage> {
        self.page.as_ref().ok_or(DriverError::NoPage)
    }
}

#[async_trait]
impl PageDriver for HttpPageDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.page = None;

        if self.closed {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                message: "driver has been closed".to_string(),
            });
        }

        let fetch = fetch_page(&self.client, &self.user_agent, url);
        let result = tokio::time::timeout(self.navigation_timeout, fetch).await;

        match result {
            Ok(Ok(page)) => {
                tracing::trace!("Loaded {} ({} bytes)", page.url, page.body.len());
                self.page = Some(page);
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(DriverError::Timeout {
                condition: format!("response from {}", url),
                waited: self.navigation_timeout,
            }),
        }
    }

    async fn wait_for(&mut self, condition: &Readiness, timeout: Duration) -> DriverResult<()> {
        let page = self.page()?;

        match condition {
            Readiness::Immediate => Ok(()),
            Readiness::ElementPresent(selector) => {
                if Document::parse(&page.body).contains(selector)? {
                    Ok(())
                } else {
                    Err(DriverError::Timeout {
                        condition: condition.to_string(),
                        waited: timeout,
                    })
                }
            }
        }
    }

    async fn markup(&mut self) -> DriverResult<String> {
        Ok(self.page()?.body.clone())
    }

    async fn hyperlinks(&mut self) -> DriverResult<Vec<Hyperlink>> {
        let page = self.page()?;
        Ok(Document::parse(&page.body).hyperlinks(&page.url))
    }

    async fn title(&mut self) -> DriverResult<String> {
        Ok(Document::parse(&self.page()?.body)
            .title()
            .unwrap_or_default())
    }

    fn current_url(&self) -> Option<&str> {
        self.page.as_ref().map(|page| page.url.as_str())
    }

    async fn set_user_agent(&mut self, user_agent: &str) -> DriverResult<()> {
        self.user_agent = user_agent.to_string();
        Ok(())
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.page = None;
        self.closed = true;
        tracing::debug!("HTTP page driver closed");
        Ok(())
    }
}

/// Fetches a URL and classifies the response
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML or no Content-Type | page loaded |
/// | 2xx with another Content-Type | ContentMismatch |
/// | any other status | Http |
/// | timeout | Timeout |
/// | connection refused, DNS, TLS | Navigation |
async fn fetch_page(client: &Client, user_agent: &str, url: &str) -> DriverResult<LoadedPage> {
    let response = client
        .get(url)
        .header(USER_AGENT, user_agent)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DriverError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.is_empty() && !content_type.contains("html") {
        return Err(DriverError::ContentMismatch {
            url: url.to_string(),
            content_type,
        });
    }

    let final_url = response.url().clone();
    let body = response.text().await.map_err(|e| classify_error(url, e))?;

    Ok(LoadedPage {
        url: final_url,
        body,
    })
}

/// Maps a client error onto the driver's failure kinds
fn classify_error(url: &str, error: reqwest::Error) -> DriverError {
    if error.is_timeout() {
        DriverError::Timeout {
            condition: format!("response from {}", url),
            waited: CLIENT_TIMEOUT,
        }
    } else if error.is_connect() {
        DriverError::Navigation {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        DriverError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
