//! Flare - An emergency-alert dispatcher with graceful degradation
//!
//! This library guarantees that some notification reaches the recipient:
//! rich delivery (text plus attachments) is preferred, but each attachment
//! degrades through a prioritized list of delivery channels, and exactly one
//! final status text is always produced.

pub mod channel;
pub mod cli;
pub mod config;
pub mod core;
pub mod dispatcher;
pub mod formatting;
pub mod orchestrator;
pub mod registry;
pub mod settle;
pub mod store;
pub mod transport;

#[cfg(feature = "test-utils")]
pub mod test_support;

// Re-export core types for convenience
pub use crate::core::*;
pub use orchestrator::{AlertOrchestrator, OrchestratorBuilder};
