//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the dispatch binary
//! using the `clap` crate. These arguments are parsed at startup and then
//! merged with the configuration from the `flare.toml` file and environment
//! variables.

use clap::Parser;
use figment::{
    providers::Serialized,
    value::{Dict, Map},
    Error, Metadata, Profile, Provider,
};
use serde::Serialize;
use std::path::PathBuf;

/// An emergency-alert dispatcher with graceful channel degradation.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Recipient address for the alert (e.g. a phone number).
    #[arg(long, value_name = "ADDRESS")]
    pub to: Option<String>,

    /// The alert body text.
    #[arg(long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Path to an attachment; repeat for multiple attachments.
    #[arg(long, value_name = "PATH")]
    pub attach: Vec<String>,

    /// Settle delay between channel attempts in milliseconds.
    #[arg(long, value_name = "MS")]
    pub settle_ms: Option<u64>,

    /// Timeout for a single channel attempt in milliseconds.
    #[arg(long, value_name = "MS")]
    pub attempt_timeout_ms: Option<u64>,

    /// URL of the HTTP messaging gateway.
    #[arg(long, value_name = "URL")]
    pub gateway_url: Option<String>,
}

/// The subset of `Config` the CLI can override, shaped to merge cleanly.
#[derive(Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    delivery: Option<DeliveryOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gateway: Option<GatewayOverrides>,
}

#[derive(Serialize)]
struct DeliveryOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    settle_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempt_timeout_ms: Option<u64>,
}

#[derive(Serialize)]
struct GatewayOverrides {
    url: String,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let delivery = if self.settle_ms.is_some() || self.attempt_timeout_ms.is_some() {
            Some(DeliveryOverrides {
                settle_ms: self.settle_ms,
                attempt_timeout_ms: self.attempt_timeout_ms,
            })
        } else {
            None
        };
        let gateway = self
            .gateway_url
            .clone()
            .map(|url| GatewayOverrides { url });

        Serialized::defaults(CliOverrides { delivery, gateway }).data()
    }
}
