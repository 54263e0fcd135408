//! Cooperative cancellation
//!
//! A run owns one [`CancellationController`]. Its token is handed to the
//! harvester and crawl engine, which check it before each page and stop
//! cleanly once it is set. Only the interrupt listener (or the owner of the
//! controller) sets it.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owns the cancellation token for a run
#[derive(Debug, Clone, Default)]
pub struct CancellationController {
    token: CancellationToken,
}

impl CancellationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token to pass into long-running operations
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Requests cancellation; repeated calls have no further effect
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Spawns a task that cancels the run on Ctrl+C
    ///
    /// The task ends on the first interrupt or once the token is cancelled
    /// by other means. Abort the handle when the run finishes normally.
    pub fn listen_for_interrupt(&self) -> JoinHandle<()> {
        let token = self.token.clone();

        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => match result {
                    Ok(()) => {
                        tracing::warn!("Interrupt received, finishing current page and saving progress");
                        token.cancel();
                    }
                    Err(e) => {
                        tracing::error!("Unable to listen for interrupt signal: {}", e);
                    }
                },
                _ = token.cancelled() => {}
            }
        })
    }
}
