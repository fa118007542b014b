//! Core domain types and service traits for Flare
//!
//! This module defines the fundamental data structures and trait contracts
//! that govern component interactions throughout the dispatch engine.

use crate::transport::TransportError;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// A single emergency alert to be dispatched to one recipient.
///
/// Immutable once constructed; owned exclusively by the orchestrator for the
/// duration of one dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// The recipient address (e.g. a phone number).
    pub recipient: String,
    /// The alert body text as entered by the user.
    pub body: String,
    /// Attachments in capture order. Index order is dispatch order.
    pub attachments: Vec<AttachmentRef>,
}

impl Alert {
    /// Creates a new alert, assigning attachment indexes from insertion order.
    pub fn new(
        recipient: impl Into<String>,
        body: impl Into<String>,
        locators: Vec<String>,
    ) -> Self {
        let attachments = locators
            .into_iter()
            .enumerate()
            .map(|(index, locator)| AttachmentRef { index, locator })
            .collect();
        Self {
            recipient: recipient.into(),
            body: body.into(),
            attachments,
        }
    }
}

/// An opaque reference to one attachment's bytes.
///
/// The locator is not validated at construction; a missing or unreadable
/// attachment is a recoverable per-attachment failure at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    /// Zero-based position within the alert.
    pub index: usize,
    /// Opaque reference to the attachment bytes (e.g. a filesystem path).
    pub locator: String,
}

impl AttachmentRef {
    /// The one-based ordinal used in recipient-facing message text.
    pub fn ordinal(&self) -> usize {
        self.index + 1
    }
}

/// The result of a single channel attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The channel accepted the payload for delivery (fire-and-forget).
    Accepted,
    /// The channel declined the payload; dispatch continues to the next
    /// candidate. The reason is diagnostic only and never recipient-facing.
    Rejected(String),
}

/// A recorded per-channel failure for one attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelFailure {
    /// Identifier of the channel that failed.
    pub channel: String,
    /// Diagnostic reason reported by the channel.
    pub reason: String,
}

/// The outcome of dispatching one attachment across the channel registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    /// Index of the attachment this outcome describes.
    pub attachment_index: usize,
    /// Identifier of the channel that accepted the attachment, if any.
    pub succeeded_channel: Option<String>,
    /// Failures accumulated before success or exhaustion, in attempt order.
    pub failures: Vec<ChannelFailure>,
}

impl DispatchOutcome {
    /// Whether some channel accepted this attachment.
    pub fn delivered(&self) -> bool {
        self.succeeded_channel.is_some()
    }
}

/// Per-call summary returned to the caller on overall success.
///
/// A successful dispatch may still be heavily degraded (zero attachments
/// delivered, only text notices); the communication goal is met as long as
/// the guaranteed final text went out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// RFC 3339 timestamp of when the dispatch started.
    pub started_at: String,
    /// Attachments accepted by some channel.
    pub delivered: usize,
    /// Attachments that fell back to a degraded text notice.
    pub degraded: usize,
    /// Per-attachment outcomes in index order.
    pub outcomes: Vec<DispatchOutcome>,
}

/// The fatal error tier. Everything below this is absorbed inside the engine
/// and translated into degraded-but-successful outcomes.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("alert has no recipient address")]
    MissingRecipient,

    /// The guaranteed final or no-attachments text could not be sent. This is
    /// the one message whose failure is not swallowed, because it is the last
    /// guaranteed notification to the recipient.
    #[error("failed to send the guaranteed notice: {reason}")]
    FinalNotice { reason: String },

    /// An unexpected platform fault surfaced by a channel.
    #[error(transparent)]
    Channel(#[from] anyhow::Error),
}

// =============================================================================
// Service Traits
// =============================================================================

/// The host platform's plain-text send primitive.
#[async_trait]
pub trait TextTransport: Send + Sync {
    /// Sends a text message to the given address.
    ///
    /// # Returns
    /// * `Ok(())` once the transport accepted the request
    /// * `Err` if the transport rejected it or is unavailable
    async fn send_text(&self, address: &str, body: &str) -> Result<(), TransportError>;
}

/// The host platform's attachment send primitive.
///
/// The handler identifier selects which external application is targeted;
/// the transport itself is shared across all handlers.
#[async_trait]
pub trait AttachmentTransport: Send + Sync {
    /// Hands one attachment to the named external handler.
    async fn send_attachment(
        &self,
        handler: &str,
        address: &str,
        locator: &str,
        caption: &str,
    ) -> Result<(), TransportError>;
}

/// Checks whether an attachment locator resolves to readable content.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    async fn exists(&self, locator: &str) -> bool;
}

/// Authorizes an external handler to read attachment content before a
/// delivery attempt. Grant failure is an ordinary channel rejection.
#[async_trait]
pub trait PermissionGranter: Send + Sync {
    async fn grant(&self, handler: &str, locator: &str) -> Result<(), TransportError>;
}

/// A granter for hosts without per-handler read grants.
pub struct NoopGranter;

#[async_trait]
impl PermissionGranter for NoopGranter {
    async fn grant(&self, _handler: &str, _locator: &str) -> Result<(), TransportError> {
        Ok(())
    }
}

/// One concrete delivery mechanism for attachments.
///
/// A channel never errors for ordinary handler absence or rejection; those
/// conditions come back as `AttemptOutcome::Rejected` so the dispatcher can
/// continue down the registry. Only genuinely unexpected platform faults
/// propagate as `Err`, which aborts the whole dispatch.
#[async_trait]
pub trait Channel: Send + Sync {
    /// A unique, descriptive identifier for the channel. Used for logging,
    /// metrics, and the diagnostic failure list.
    fn identifier(&self) -> &str;

    /// Attempts to deliver one attachment through this channel.
    async fn attempt(
        &self,
        alert: &Alert,
        attachment: &AttachmentRef,
    ) -> Result<AttemptOutcome>;
}
