//! A delivery channel targeting one named external handler.

use crate::core::{
    Alert, AttachmentRef, AttachmentTransport, AttemptOutcome, Channel, PermissionGranter,
};
use crate::formatting;
use crate::transport::TransportError;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Wraps the attachment send primitive for a single handler identifier.
///
/// The handler is granted read access to the attachment before every attempt;
/// a refused grant is an ordinary rejection, not a fault.
pub struct HandlerChannel {
    handler: String,
    transport: Arc<dyn AttachmentTransport>,
    granter: Arc<dyn PermissionGranter>,
}

impl HandlerChannel {
    pub fn new(
        handler: String,
        transport: Arc<dyn AttachmentTransport>,
        granter: Arc<dyn PermissionGranter>,
    ) -> Self {
        Self {
            handler,
            transport,
            granter,
        }
    }
}

#[async_trait]
impl Channel for HandlerChannel {
    fn identifier(&self) -> &str {
        &self.handler
    }

    async fn attempt(
        &self,
        alert: &Alert,
        attachment: &AttachmentRef,
    ) -> Result<AttemptOutcome> {
        if let Err(e) = self.granter.grant(&self.handler, &attachment.locator).await {
            warn!(handler = %self.handler, locator = %attachment.locator, error = %e,
                "Read grant refused, skipping handler");
            return Ok(AttemptOutcome::Rejected(format!("grant refused: {}", e)));
        }

        let caption = formatting::attachment_caption(
            &alert.body,
            attachment.ordinal(),
            alert.attachments.len(),
        );

        match self
            .transport
            .send_attachment(&self.handler, &alert.recipient, &attachment.locator, &caption)
            .await
        {
            Ok(()) => {
                debug!(handler = %self.handler, index = attachment.index,
                    "Handler accepted attachment");
                Ok(AttemptOutcome::Accepted)
            }
            Err(e @ TransportError::Fault(_)) => {
                // The transport object itself is unusable; abort the dispatch.
                Err(e.into())
            }
            Err(e) => {
                debug!(handler = %self.handler, index = attachment.index, error = %e,
                    "Handler declined attachment");
                Ok(AttemptOutcome::Rejected(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NoopGranter;
    use std::sync::Mutex;

    struct ScriptedTransport {
        result: Mutex<Option<Result<(), TransportError>>>,
        captions: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(result: Result<(), TransportError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                captions: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AttachmentTransport for ScriptedTransport {
        async fn send_attachment(
            &self,
            _handler: &str,
            _address: &str,
            _locator: &str,
            caption: &str,
        ) -> Result<(), TransportError> {
            self.captions.lock().unwrap().push(caption.to_string());
            self.result.lock().unwrap().take().unwrap_or(Ok(()))
        }
    }

    struct RefusingGranter;

    #[async_trait]
    impl PermissionGranter for RefusingGranter {
        async fn grant(&self, _handler: &str, _locator: &str) -> Result<(), TransportError> {
            Err(TransportError::Rejected("no grant".to_string()))
        }
    }

    fn test_alert() -> Alert {
        Alert::new(
            "+15550001",
            "fire detected",
            vec!["/tmp/a.jpg".to_string(), "/tmp/b.jpg".to_string()],
        )
    }

    #[tokio::test]
    async fn test_accepted_attempt_carries_ordinal_caption() {
        let transport = Arc::new(ScriptedTransport::new(Ok(())));
        let channel = HandlerChannel::new(
            "com.android.mms".to_string(),
            transport.clone(),
            Arc::new(NoopGranter),
        );
        let alert = test_alert();

        let outcome = channel.attempt(&alert, &alert.attachments[0]).await.unwrap();

        assert_eq!(outcome, AttemptOutcome::Accepted);
        let captions = transport.captions.lock().unwrap();
        assert!(captions[0].contains("Emergency photo 1 of 2"));
    }

    #[tokio::test]
    async fn test_rejection_is_not_an_error() {
        let transport = Arc::new(ScriptedTransport::new(Err(TransportError::Unavailable(
            "handler absent".to_string(),
        ))));
        let channel = HandlerChannel::new(
            "com.android.mms".to_string(),
            transport,
            Arc::new(NoopGranter),
        );
        let alert = test_alert();

        let outcome = channel.attempt(&alert, &alert.attachments[0]).await.unwrap();

        match outcome {
            AttemptOutcome::Rejected(reason) => assert!(reason.contains("handler absent")),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_grant_refusal_is_a_rejection() {
        let transport = Arc::new(ScriptedTransport::new(Ok(())));
        let channel = HandlerChannel::new(
            "com.android.mms".to_string(),
            transport.clone(),
            Arc::new(RefusingGranter),
        );
        let alert = test_alert();

        let outcome = channel.attempt(&alert, &alert.attachments[0]).await.unwrap();

        assert!(matches!(outcome, AttemptOutcome::Rejected(_)));
        // The transport must not be touched when the grant is refused.
        assert!(transport.captions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_fault_propagates() {
        let transport = Arc::new(ScriptedTransport::new(Err(TransportError::Fault(
            "transport gone".to_string(),
        ))));
        let channel = HandlerChannel::new(
            "com.android.mms".to_string(),
            transport,
            Arc::new(NoopGranter),
        );
        let alert = test_alert();

        let result = channel.attempt(&alert, &alert.attachments[0]).await;

        assert!(result.is_err());
    }
}
