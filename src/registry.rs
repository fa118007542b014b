//! The fixed, priority-ordered list of delivery channels.

use crate::channel::{HandlerChannel, TextChannel};
use crate::config::Config;
use crate::core::{AttachmentTransport, Channel, PermissionGranter, TextTransport};
use std::sync::Arc;
use tracing::info;

/// Holds the attachment-capable channels in priority order, plus the
/// independent baseline text channel.
///
/// Insertion order is priority order and is fixed at construction; nothing
/// reorders or mutates the list during a dispatch. New handlers are added by
/// appending to the configured list, not by changing dispatch logic.
pub struct ChannelRegistry {
    channels: Vec<Arc<dyn Channel>>,
    text: TextChannel,
}

impl ChannelRegistry {
    /// Builds a registry from an explicit channel list. Used by tests and by
    /// hosts that construct channels themselves.
    pub fn new(channels: Vec<Arc<dyn Channel>>, text: TextChannel) -> Self {
        Self { channels, text }
    }

    /// Assembles the curated handler list from configuration.
    pub fn from_config(
        config: &Config,
        attachment_transport: Arc<dyn AttachmentTransport>,
        text_transport: Arc<dyn TextTransport>,
        granter: Arc<dyn PermissionGranter>,
    ) -> Self {
        let channels: Vec<Arc<dyn Channel>> = config
            .handlers
            .iter()
            .map(|handler| {
                Arc::new(HandlerChannel::new(
                    handler.clone(),
                    attachment_transport.clone(),
                    granter.clone(),
                )) as Arc<dyn Channel>
            })
            .collect();
        info!(count = channels.len(), "Channel registry assembled");
        Self::new(channels, TextChannel::new(text_transport))
    }

    /// The attachment-capable channels, highest priority first.
    pub fn attachment_channels(&self) -> &[Arc<dyn Channel>] {
        &self.channels
    }

    /// The baseline text channel.
    pub fn text(&self) -> &TextChannel {
        &self.text
    }
}
