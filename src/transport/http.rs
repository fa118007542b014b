//! An HTTP messaging-gateway client implementing both send primitives.
//!
//! Hosts that do not expose a native telephony transport can point Flare at
//! an HTTP gateway (e.g. an SMS/MMS relay on the local network). The gateway
//! receives one JSON document per send and answers with a 2xx status once it
//! has accepted the payload; acceptance is all the engine requires.

use crate::core::{AttachmentTransport, TextTransport};
use crate::transport::TransportError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, instrument};

/// A client for a JSON-over-HTTP messaging gateway.
pub struct HttpGateway {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpGateway {
    /// Creates a new gateway client for the given endpoint URL.
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
            timeout,
        }
    }

    async fn post(&self, payload: &Value) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => {
                debug!(endpoint = %self.endpoint, "Gateway accepted payload");
                Ok(())
            }
            Ok(res) => {
                let status = res.status();
                let text = res.text().await.unwrap_or_default();
                error!(status = %status, body = %text, "Gateway refused payload");
                Err(TransportError::Rejected(format!(
                    "gateway returned status {}",
                    status
                )))
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                error!(error = %e, "Gateway unreachable");
                Err(TransportError::Unavailable(e.to_string()))
            }
            Err(e) => {
                error!(error = %e, "HTTP request to gateway failed");
                Err(TransportError::Fault(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl TextTransport for HttpGateway {
    #[instrument(skip(self, body))]
    async fn send_text(&self, address: &str, body: &str) -> Result<(), TransportError> {
        let payload = json!({
            "kind": "text",
            "to": address,
            "body": body,
        });
        self.post(&payload).await
    }
}

#[async_trait]
impl AttachmentTransport for HttpGateway {
    #[instrument(skip(self, caption))]
    async fn send_attachment(
        &self,
        handler: &str,
        address: &str,
        locator: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        let payload = json!({
            "kind": "attachment",
            "handler": handler,
            "to": address,
            "locator": locator,
            "caption": caption,
        });
        self.post(&payload).await
    }
}

#[cfg(test)]
mod http_gateway_tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_text_success() {
        // Arrange
        let server = MockServer::start().await;
        let expected_body = json!({
            "kind": "text",
            "to": "+15550001",
            "body": "fire detected",
        });

        Mock::given(method("POST"))
            .and(path("/send"))
            .and(body_json(&expected_body))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gateway = HttpGateway::new(
            format!("{}/send", server.uri()),
            Duration::from_secs(5),
        );

        // Act
        let result = gateway.send_text("+15550001", "fire detected").await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_attachment_payload_shape() {
        // Arrange
        let server = MockServer::start().await;
        let expected_body = json!({
            "kind": "attachment",
            "handler": "com.android.mms",
            "to": "+15550001",
            "locator": "/tmp/a.jpg",
            "caption": "photo 1 of 2",
        });

        Mock::given(method("POST"))
            .and(path("/send"))
            .and(body_json(&expected_body))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gateway = HttpGateway::new(
            format!("{}/send", server.uri()),
            Duration::from_secs(5),
        );

        // Act
        let result = gateway
            .send_attachment("com.android.mms", "+15550001", "/tmp/a.jpg", "photo 1 of 2")
            .await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_server_error_is_rejection() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let gateway = HttpGateway::new(server.uri(), Duration::from_secs(5));

        // Act
        let result = gateway.send_text("+15550001", "hello").await;

        // Assert
        assert!(matches!(result, Err(TransportError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_slow_gateway_is_unavailable() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let gateway = HttpGateway::new(server.uri(), Duration::from_millis(200));

        // Act
        let result = gateway.send_text("+15550001", "hello").await;

        // Assert
        assert!(matches!(result, Err(TransportError::Unavailable(_))));
    }
}
