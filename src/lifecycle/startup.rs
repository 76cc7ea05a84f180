//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the route table before any traffic is accepted
//! - Initialize subsystems in dependency order
//! - Bind the listener last and serve until a termination signal
//!
//! # Design Decisions
//! - Invalid process settings are fatal; a missing route table is not

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{route_source, RelayConfig};
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::net::tls;
use crate::observability::metrics;
use crate::routing::RouteTable;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid address {0:?}: {1}")]
    Address(String, std::net::AddrParseError),

    #[error("failed to bind {0}: {1}")]
    Bind(SocketAddr, std::io::Error),

    #[error("failed to load TLS configuration: {0}")]
    Tls(std::io::Error),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Load the route table named by the configuration.
pub fn load_routes(config: &RelayConfig) -> Arc<RouteTable> {
    let raw = route_source(&config.routes);
    Arc::new(RouteTable::from_config_value(raw.as_deref()))
}

/// Start every subsystem and serve until the process is told to stop.
pub async fn run(config: RelayConfig) -> Result<(), StartupError> {
    let routes = load_routes(&config);

    if config.observability.metrics_enabled {
        let addr = parse_addr(&config.observability.metrics_address)?;
        metrics::init_metrics(addr)?;
    }

    let addr = parse_addr(&config.listener.bind_address)?;
    let tls_config = match &config.listener.tls {
        Some(tls) => Some(tls::from_config(tls).await.map_err(StartupError::Tls)?),
        None => None,
    };

    tracing::info!(
        bind_address = %addr,
        tls = tls_config.is_some(),
        public_scheme = config.public_scheme(),
        strip_host = config.forwarding.strip_host,
        forwarded_headers = config.forwarding.forwarded_headers,
        max_body_bytes = config.forwarding.max_body_bytes,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_handler(shutdown.clone());

    let server = HttpServer::new(&config, routes)?;
    match tls_config {
        Some(tls_config) => server.run_tls(addr, tls_config, shutdown.subscribe()).await?,
        None => {
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|e| StartupError::Bind(addr, e))?;
            server.run(listener, shutdown.subscribe()).await?
        }
    }

    Ok(())
}

fn parse_addr(raw: &str) -> Result<SocketAddr, StartupError> {
    raw.parse()
        .map_err(|e| StartupError::Address(raw.to_string(), e))
}
