//! The top-level dispatch state machine.

use crate::config::Config;
use crate::core::{
    Alert, AttachmentStore, AttachmentTransport, DispatchError, DispatchOutcome, DispatchReport,
    NoopGranter, PermissionGranter, TextTransport,
};
use crate::dispatcher::AttachmentDispatcher;
use crate::formatting;
use crate::registry::ChannelRegistry;
use crate::settle::{TokioWait, WaitPolicy};
use crate::store::FsAttachmentStore;
use crate::transport::HttpGateway;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Sequences attachment dispatch for one alert and guarantees the final text.
///
/// The orchestrator owns no cross-call state: concurrent `dispatch_alert`
/// calls for different alerts are permitted, but each call is internally
/// serial. There is no mid-dispatch cancellation; a partially sent emergency
/// alert is considered unacceptable, so a started dispatch runs to completion
/// or fatal failure.
pub struct AlertOrchestrator {
    registry: Arc<ChannelRegistry>,
    dispatcher: AttachmentDispatcher,
}

impl AlertOrchestrator {
    /// Creates a new `OrchestratorBuilder` to construct an orchestrator.
    pub fn builder(config: Config) -> OrchestratorBuilder {
        OrchestratorBuilder::new(config)
    }

    /// Dispatches one alert end to end.
    ///
    /// Whatever happens to the attachments, exactly one final text is sent;
    /// only that text's failure (or a malformed alert) is surfaced as `Err`.
    #[instrument(skip(self, alert), fields(recipient = %alert.recipient, attachments = alert.attachments.len()))]
    pub async fn dispatch_alert(&self, alert: &Alert) -> Result<DispatchReport, DispatchError> {
        if alert.recipient.trim().is_empty() {
            return Err(DispatchError::MissingRecipient);
        }

        let started_at = Utc::now().to_rfc3339();
        let start = std::time::Instant::now();
        info!("Dispatch started");

        if alert.attachments.is_empty() {
            let notice = formatting::no_attachments_notice(&alert.body);
            self.send_guaranteed(&alert.recipient, &notice).await?;
            info!("Dispatch complete (text only)");
            return Ok(DispatchReport {
                started_at,
                delivered: 0,
                degraded: 0,
                outcomes: Vec::new(),
            });
        }

        let total = alert.attachments.len();
        let mut outcomes: Vec<DispatchOutcome> = Vec::with_capacity(total);

        // Attachments are processed strictly in index order, never in
        // parallel: interleaved external-handler launches are unreliable on
        // the hosts this engine targets.
        for attachment in &alert.attachments {
            let outcome = self.dispatcher.dispatch(alert, attachment).await?;

            if !outcome.delivered() {
                // Degraded notices go out inline, not batched, so the
                // recipient learns of a failed photo as early as possible.
                // Their failures are logged but never fatal.
                let notice =
                    formatting::degraded_notice(&alert.body, attachment.ordinal(), total);
                if let Err(e) = self.registry.text().send(&alert.recipient, &notice).await {
                    error!(index = attachment.index, error = %e,
                        "Failed to send degraded notice");
                    metrics::counter!("degraded_notice_failures_total").increment(1);
                }
            }

            outcomes.push(outcome);
        }

        let summary = formatting::summary(&alert.body, total);
        self.send_guaranteed(&alert.recipient, &summary).await?;

        let delivered = outcomes.iter().filter(|o| o.delivered()).count();
        let degraded = total - delivered;
        if degraded > 0 {
            warn!(delivered, degraded, "Dispatch complete with degraded attachments");
        } else {
            info!(delivered, "Dispatch complete");
        }
        metrics::histogram!("dispatch_duration_seconds").record(start.elapsed().as_secs_f64());

        Ok(DispatchReport {
            started_at,
            delivered,
            degraded,
            outcomes,
        })
    }

    /// Sends a text whose failure aborts the dispatch.
    async fn send_guaranteed(&self, address: &str, body: &str) -> Result<(), DispatchError> {
        self.registry
            .text()
            .send(address, body)
            .await
            .map_err(|e| {
                error!(error = %e, "Guaranteed text failed, dispatch is fatal");
                DispatchError::FinalNotice {
                    reason: e.to_string(),
                }
            })
    }
}

/// Builder for the orchestrator.
///
/// This pattern separates component construction from dispatch and provides a
/// convenient way to override collaborators for testing.
pub struct OrchestratorBuilder {
    config: Config,
    text_transport: Option<Arc<dyn TextTransport>>,
    attachment_transport: Option<Arc<dyn AttachmentTransport>>,
    store: Option<Arc<dyn AttachmentStore>>,
    granter: Option<Arc<dyn PermissionGranter>>,
    wait: Option<Arc<dyn WaitPolicy>>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            text_transport: None,
            attachment_transport: None,
            store: None,
            granter: None,
            wait: None,
        }
    }

    /// Overrides the text-send primitive.
    pub fn text_transport(mut self, transport: Arc<dyn TextTransport>) -> Self {
        self.text_transport = Some(transport);
        self
    }

    /// Overrides the attachment-send primitive.
    pub fn attachment_transport(mut self, transport: Arc<dyn AttachmentTransport>) -> Self {
        self.attachment_transport = Some(transport);
        self
    }

    /// Overrides the attachment store.
    pub fn store(mut self, store: Arc<dyn AttachmentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Overrides the permission granter.
    pub fn granter(mut self, granter: Arc<dyn PermissionGranter>) -> Self {
        self.granter = Some(granter);
        self
    }

    /// Overrides the wait policy applied after every channel attempt.
    pub fn wait_policy(mut self, wait: Arc<dyn WaitPolicy>) -> Self {
        self.wait = Some(wait);
        self
    }

    /// Builds the orchestrator, filling unset collaborators from config.
    pub fn build(self) -> AlertOrchestrator {
        let config = self.config;

        // Both primitives default to one shared HTTP gateway client.
        let gateway = Arc::new(HttpGateway::new(
            config.gateway.url.clone(),
            Duration::from_millis(config.gateway.request_timeout_ms),
        ));
        let text_transport = self
            .text_transport
            .unwrap_or_else(|| gateway.clone() as Arc<dyn TextTransport>);
        let attachment_transport = self
            .attachment_transport
            .unwrap_or_else(|| gateway.clone() as Arc<dyn AttachmentTransport>);

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(FsAttachmentStore) as Arc<dyn AttachmentStore>);
        let granter = self
            .granter
            .unwrap_or_else(|| Arc::new(NoopGranter) as Arc<dyn PermissionGranter>);
        let wait = self.wait.unwrap_or_else(|| {
            Arc::new(TokioWait::new(Duration::from_millis(config.delivery.settle_ms)))
                as Arc<dyn WaitPolicy>
        });

        let registry = Arc::new(ChannelRegistry::from_config(
            &config,
            attachment_transport,
            text_transport,
            granter,
        ));
        let dispatcher = AttachmentDispatcher::new(
            registry.clone(),
            store,
            wait,
            Duration::from_millis(config.delivery.attempt_timeout_ms),
        );

        AlertOrchestrator {
            registry,
            dispatcher,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingText {
        sent: Mutex<Vec<String>>,
    }

    impl RecordingText {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextTransport for RecordingText {
        async fn send_text(&self, _address: &str, body: &str) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(body.to_string());
            Ok(())
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.delivery.settle_ms = 0;
        config
    }

    #[tokio::test]
    async fn test_missing_recipient_is_fatal_and_sends_nothing() {
        let text = RecordingText::new();
        let orchestrator = AlertOrchestrator::builder(test_config())
            .text_transport(text.clone())
            .build();
        let alert = Alert::new("", "fire detected", vec![]);

        let result = orchestrator.dispatch_alert(&alert).await;

        assert!(matches!(result, Err(DispatchError::MissingRecipient)));
        assert!(text.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_attachment_list_sends_single_notice() {
        let text = RecordingText::new();
        let orchestrator = AlertOrchestrator::builder(test_config())
            .text_transport(text.clone())
            .build();
        let alert = Alert::new("+15550001", "evacuate now", vec![]);

        let report = orchestrator.dispatch_alert(&alert).await.unwrap();

        assert_eq!(report.delivered, 0);
        assert_eq!(report.degraded, 0);
        assert!(report.outcomes.is_empty());
        let sent = text.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("evacuate now"));
        assert!(sent[0].contains("No photos captured"));
    }
}
