//! Flare - Emergency alert dispatch binary
//!
//! Parses the command line, layers configuration, and runs a single alert
//! dispatch through the orchestrator.

use anyhow::Result;
use clap::Parser;
use flare::{
    cli::Cli,
    config::Config,
    core::{Alert, DispatchError},
    orchestrator::AlertOrchestrator,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        // Manually initialize logging for this specific error
        tracing_subscriber::fmt().init();
        error!("Failed to load configuration: {}", err);
        // Exit if configuration fails, as it's a critical step.
        std::process::exit(1);
    });

    // Initialize logging; RUST_LOG overrides the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Flare starting up...");
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Handlers: {}", config.handlers.join(", "));
    info!("Settle Delay: {}ms", config.delivery.settle_ms);
    info!("Attempt Timeout: {}ms", config.delivery.attempt_timeout_ms);
    info!("Gateway URL: {}", config.gateway.url);
    info!("-------------------------------------------------------");

    let recipient = cli.to.clone().unwrap_or_else(|| {
        error!("A recipient address is required (--to)");
        std::process::exit(2);
    });
    let body = cli.message.clone().unwrap_or_else(|| {
        error!("A message body is required (--message)");
        std::process::exit(2);
    });

    let alert = Alert::new(recipient, body, cli.attach.clone());
    let orchestrator = AlertOrchestrator::builder(config).build();

    match orchestrator.dispatch_alert(&alert).await {
        Ok(report) => {
            if report.degraded > 0 {
                warn!(
                    "Alert dispatched with degraded attachments: {} delivered, {} degraded",
                    report.delivered, report.degraded
                );
            } else {
                info!("Alert dispatched: {} attachments delivered", report.delivered);
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e @ DispatchError::MissingRecipient) => {
            error!("Alert failed: {}", e);
            std::process::exit(2);
        }
        Err(e) => {
            // No guaranteed notification could be delivered.
            error!("Alert failed: {}", e);
            std::process::exit(1);
        }
    }
}
