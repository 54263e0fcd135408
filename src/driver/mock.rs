//! Scripted page driver for unit tests

use crate::driver::traits::{DriverError, DriverResult, PageDriver, Readiness};
use crate::markup::{Document, Hyperlink};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Serves canned markup per URL and records every call
#[derive(Default)]
pub(crate) struct MockDriver {
    pages: HashMap<String, String>,
    failures: HashMap<String, u16>,
    current: Option<(Url, String)>,
    cancel_on: Option<(usize, CancellationToken)>,
    pub navigations: Vec<String>,
    pub user_agents: Vec<String>,
    pub closed: bool,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` for `url`
    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Answers `url` with an HTTP error status
    pub fn failing(mut self, url: &str, status: u16) -> Self {
        self.failures.insert(url.to_string(), status);
        self
    }

    /// Cancels `token` while serving the n-th navigation (1-based)
    pub fn cancel_on_navigation(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_on = Some((n, token));
        self
    }

    fn current(&self) -> DriverResult<&(Url, String)> {
        self.current.as_ref().ok_or(DriverError::NoPage)
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.current = None;
        self.navigations.push(url.to_string());

        if let Some((n, token)) = &self.cancel_on {
            if self.navigations.len() == *n {
                token.cancel();
            }
        }

        if let Some(status) = self.failures.get(url) {
            return Err(DriverError::Http {
                url: url.to_string(),
                status: *status,
            });
        }

        let body = self.pages.get(url).cloned().ok_or_else(|| DriverError::Http {
            url: url.to_string(),
            status: 404,
        })?;
        let parsed = Url::parse(url).map_err(|e| DriverError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        self.current = Some((parsed, body));
        Ok(())
    }

    async fn wait_for(&mut self, condition: &Readiness, timeout: Duration) -> DriverResult<()> {
        let (_, body) = self.current()?;
        match condition {
            Readiness::Immediate => Ok(()),
            Readiness::ElementPresent(selector) => {
                if Document::parse(body).contains(selector)? {
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
        Ok(self.current()?.1.clone())
    }

    async fn hyperlinks(&mut self) -> DriverResult<Vec<Hyperlink>> {
        let (url, body) = self.current()?;
        Ok(Document::parse(body).hyperlinks(url))
    }

    async fn title(&mut self) -> DriverResult<String> {
        Ok(Document::parse(&self.current()?.1).title().unwrap_or_default())
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|(url, _)| url.as_str())
    }

    async fn set_user_agent(&mut self, user_agent: &str) -> DriverResult<()> {
        self.user_agents.push(user_agent.to_string());
        Ok(())
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.closed = true;
        Ok(())
    }
}
