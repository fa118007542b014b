//! Configuration management for Flare
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all engine settings. It uses the `figment` crate
//! to layer defaults, a `flare.toml` file, environment variables, and
//! command-line arguments.

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// The main configuration struct for the engine.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// External handler identifiers for attachment delivery, in priority
    /// order. This list is configuration, enumerated once, never derived at
    /// runtime.
    pub handlers: Vec<String>,
    /// Timing knobs for the dispatch loop.
    pub delivery: DeliveryConfig,
    /// Configuration for the HTTP messaging gateway.
    pub gateway: GatewayConfig,
}

/// Timing knobs for the dispatch loop.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeliveryConfig {
    /// Pause after every channel attempt, successful or not, in milliseconds.
    pub settle_ms: u64,
    /// Upper bound on a single channel attempt, in milliseconds. A hung
    /// handler becomes an ordinary `"timeout"` failure.
    pub attempt_timeout_ms: u64,
}

/// Configuration for the HTTP messaging gateway.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GatewayConfig {
    /// The gateway endpoint that accepts send requests.
    pub url: String,
    /// HTTP request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Config {
    /// Loads the engine configuration by layering sources: defaults, the
    /// TOML file, environment variables, and CLI arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| "flare.toml".into());
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // Allow overriding with environment variables, e.g. FLARE_LOG_LEVEL=debug
            .merge(Env::prefixed("FLARE_").split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            // The curated set of well-known messaging handlers, most widely
            // deployed first.
            handlers: vec![
                "com.android.mms".to_string(),
                "com.google.android.apps.messaging".to_string(),
                "com.samsung.android.messaging".to_string(),
                "com.sonyericsson.conversations".to_string(),
                "com.huawei.messaging".to_string(),
                "com.motorola.messaging".to_string(),
            ],
            delivery: DeliveryConfig {
                settle_ms: 2000,
                attempt_timeout_ms: 10_000,
            },
            gateway: GatewayConfig {
                url: "http://127.0.0.1:9080/send".to_string(),
                request_timeout_ms: 10_000,
            },
        }
    }
}
