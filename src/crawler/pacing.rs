//! Request pacing
//!
//! This module handles:
//! - Randomized delays before each request
//! - Longer pauses between batches of seeds
//! - User-agent rotation between navigations
//!
//! Every pause ends early once cancellation is requested.

use crate::config::UserAgentConfig;
use crate::driver::{DriverResult, PageDriver};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Uniformly random delay within an inclusive range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DelayPolicy {
    min: Duration,
    max: Duration,
}

impl DelayPolicy {
    /// No delay at all
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a policy; bounds given in the wrong order are swapped
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn is_disabled(&self) -> bool {
        self.max.is_zero()
    }

    /// Picks the next delay
    pub fn sample(&self) -> Duration {
        if self.is_disabled() {
            return Duration::ZERO;
        }
        if self.min == self.max {
            return self.min;
        }

        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }

    /// Sleeps for a sampled delay, waking early on cancellation
    pub async fn pause(&self, cancel: &CancellationToken) {
        let delay = self.sample();
        if delay.is_zero() || cancel.is_cancelled() {
            return;
        }

        tracing::trace!("Pausing for {:?}", delay);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => {}
        }
    }
}

/// Pool of user-agent strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentRotation {
    agents: Vec<String>,
    rotate: bool,
}

impl UserAgentRotation {
    pub fn new(agents: Vec<String>, rotate: bool) -> Self {
        Self { agents, rotate }
    }

    pub fn from_config(config: &UserAgentConfig) -> Self {
        Self::new(config.agents.clone(), config.rotate)
    }

    /// Agent the session starts with
    pub fn primary(&self) -> &str {
        self.agents.first().map(String::as_str).unwrap_or_default()
    }

    /// Agent for the next navigation, or `None` when rotation is off
    pub fn next(&self) -> Option<&str> {
        if !self.rotate {
            return None;
        }
        self.agents.choose(&mut rand::rng()).map(String::as_str)
    }
}

/// Delay and user-agent handling applied before every navigation
#[derive(Debug, Clone)]
pub struct Pacing {
    delay: DelayPolicy,
    agents: UserAgentRotation,
}

impl Pacing {
    pub fn new(delay: DelayPolicy, agents: UserAgentRotation) -> Self {
        Self { delay, agents }
    }

    /// No delays, no rotation
    pub fn unpaced() -> Self {
        Self::new(DelayPolicy::none(), UserAgentRotation::new(Vec::new(), false))
    }

    pub fn delay(&self) -> &DelayPolicy {
        &self.delay
    }

    pub async fn pause(&self, cancel: &CancellationToken) {
        self.delay.pause(cancel).await;
    }

    /// Switches the driver to the next user agent if rotation is on
    pub async fn rotate_agent<D: PageDriver + ?Sized>(&self, driver: &mut D) -> DriverResult<()> {
        if let Some(agent) = self.agents.next() {
            driver.set_user_agent(agent).await?;
        }
        Ok(())
    }
}
