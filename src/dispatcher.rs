//! Per-attachment dispatch across the channel registry.

use crate::core::{
    Alert, AttachmentRef, AttachmentStore, AttemptOutcome, ChannelFailure, DispatchOutcome,
};
use crate::registry::ChannelRegistry;
use crate::settle::WaitPolicy;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Channel identifier recorded when the locator itself fails validation.
const VALIDATION_CHANNEL: &str = "validation";

/// Tries each registry channel in priority order for a single attachment.
///
/// Attempts stop at the first acceptance. Exhaustion is not an error here;
/// the orchestrator is responsible for the degraded text notice.
pub struct AttachmentDispatcher {
    registry: Arc<ChannelRegistry>,
    store: Arc<dyn AttachmentStore>,
    wait: Arc<dyn WaitPolicy>,
    attempt_timeout: Duration,
}

impl AttachmentDispatcher {
    pub fn new(
        registry: Arc<ChannelRegistry>,
        store: Arc<dyn AttachmentStore>,
        wait: Arc<dyn WaitPolicy>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            wait,
            attempt_timeout,
        }
    }

    /// Dispatches one attachment, returning its outcome.
    ///
    /// `Err` is reserved for unexpected platform faults and aborts the whole
    /// alert; every ordinary failure lands in the outcome's failure list.
    pub async fn dispatch(
        &self,
        alert: &Alert,
        attachment: &AttachmentRef,
    ) -> Result<DispatchOutcome> {
        // Existence is validated lazily, here. A missing attachment makes no
        // channel attempts at all.
        if !self.store.exists(&attachment.locator).await {
            warn!(index = attachment.index, locator = %attachment.locator,
                "Attachment not found, skipping channel attempts");
            metrics::counter!("attachments_missing_total").increment(1);
            return Ok(DispatchOutcome {
                attachment_index: attachment.index,
                succeeded_channel: None,
                failures: vec![ChannelFailure {
                    channel: VALIDATION_CHANNEL.to_string(),
                    reason: "not found".to_string(),
                }],
            });
        }

        let mut failures = Vec::new();
        for channel in self.registry.attachment_channels() {
            let attempt =
                tokio::time::timeout(self.attempt_timeout, channel.attempt(alert, attachment))
                    .await;
            // Fixed pause after every attempt, successful or not, so the
            // handler just invoked is not overwhelmed.
            self.wait.settle().await;

            match attempt {
                Ok(Ok(AttemptOutcome::Accepted)) => {
                    info!(index = attachment.index, channel = channel.identifier(),
                        "Attachment accepted");
                    metrics::counter!("channel_attempts_total", "status" => "accepted")
                        .increment(1);
                    return Ok(DispatchOutcome {
                        attachment_index: attachment.index,
                        succeeded_channel: Some(channel.identifier().to_string()),
                        failures,
                    });
                }
                Ok(Ok(AttemptOutcome::Rejected(reason))) => {
                    debug!(index = attachment.index, channel = channel.identifier(),
                        reason = %reason, "Channel rejected attachment");
                    metrics::counter!("channel_attempts_total", "status" => "rejected")
                        .increment(1);
                    failures.push(ChannelFailure {
                        channel: channel.identifier().to_string(),
                        reason,
                    });
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    warn!(index = attachment.index, channel = channel.identifier(),
                        timeout_ms = self.attempt_timeout.as_millis() as u64,
                        "Channel attempt timed out");
                    metrics::counter!("channel_attempts_total", "status" => "timeout")
                        .increment(1);
                    failures.push(ChannelFailure {
                        channel: channel.identifier().to_string(),
                        reason: "timeout".to_string(),
                    });
                }
            }
        }

        warn!(index = attachment.index, attempts = failures.len(),
            "All channels exhausted for attachment");
        Ok(DispatchOutcome {
            attachment_index: attachment.index,
            succeeded_channel: None,
            failures,
        })
    }
}
