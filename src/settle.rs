//! The settle delay between channel attempts.
//!
//! External handlers are invoked fire-and-forget; a bounded pause after every
//! attempt keeps the engine from overwhelming whichever application was just
//! launched. The pause is injectable so tests can run the full state machine
//! without real time passing.

use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

/// A policy deciding how long to pause after each channel attempt.
#[async_trait]
pub trait WaitPolicy: Send + Sync {
    /// Pauses the dispatch sequence once.
    async fn settle(&self);
}

/// The production wait policy: a fixed `tokio::time::sleep`.
pub struct TokioWait {
    delay: Duration,
}

impl TokioWait {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl WaitPolicy for TokioWait {
    async fn settle(&self) {
        trace!(delay_ms = self.delay.as_millis() as u64, "Settling after attempt");
        tokio::time::sleep(self.delay).await;
    }
}
