//! Webhook relay.
//!
//! Gives external services (Notion, Stripe, ...) one stable webhook URL per
//! integration and forwards each delivery to whatever upstream the route
//! table currently names.
//!
//! # Architecture Overview
//!
//! ```text
//!   Webhook sender            ┌──────────────────────────────────────────┐
//!   ──────────────────────────┼─▶ http::server ─▶ routing::RouteTable     │
//!                             │        │            (path → upstream URL) │
//!                             │        ▼                                  │
//!                             │   http::forward ── reqwest ───────────────┼──▶ Upstream
//!   ◀─────────────────────────┼── http::response ◀── streamed body ◀──────┼───
//!                             └──────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! - `WEBHOOK_ROUTES`: JSON object of route key → upstream URL
//! - `--config` / `WEBHOOK_RELAY_CONFIG`: optional TOML settings file
//! - `--bind` / `WEBHOOK_RELAY_BIND`: listener address override

use std::path::PathBuf;

use clap::Parser;

use webhook_relay::config::load_or_default;
use webhook_relay::lifecycle::startup;
use webhook_relay::observability::logging;

#[derive(Parser)]
#[command(name = "webhook-relay")]
#[command(about = "Forward webhooks from stable paths to configured upstream URLs", long_about = None)]
struct Cli {
    /// TOML settings file.
    #[arg(short, long, env = "WEBHOOK_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listener address, overriding `listener.bind_address`.
    #[arg(short, long, env = "WEBHOOK_RELAY_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref(), cli.bind.as_deref())?;
    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "webhook-relay starting");

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
