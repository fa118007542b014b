//! The baseline text channel.
//!
//! Text delivery is treated as the reliable floor of the engine: every
//! degraded notice and the mandatory final summary go through this channel.

use crate::core::TextTransport;
use crate::transport::TransportError;
use std::sync::Arc;
use tracing::debug;

/// Wraps the host's plain-text send primitive.
#[derive(Clone)]
pub struct TextChannel {
    transport: Arc<dyn TextTransport>,
}

impl TextChannel {
    pub fn new(transport: Arc<dyn TextTransport>) -> Self {
        Self { transport }
    }

    /// Sends one text message to the given address.
    pub async fn send(&self, address: &str, body: &str) -> Result<(), TransportError> {
        debug!(address, bytes = body.len(), "Sending text");
        self.transport.send_text(address, body).await
    }
}
