//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.
//! The route table itself is not part of this schema: it arrives as a single
//! JSON value (see [`RoutesConfig`]) and is parsed by the routing subsystem.

use serde::{Deserialize, Serialize};

/// Environment variable holding the JSON route table by default.
pub const DEFAULT_ROUTES_ENV: &str = "WEBHOOK_ROUTES";

/// Root configuration for the webhook relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Outbound request construction policy.
    pub forwarding: ForwardingConfig,

    /// Upstream timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Where the route table comes from.
    pub routes: RoutesConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// How inbound requests are rewritten before they leave the relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Drop the inbound `host` header so the client derives it from the target URL.
    pub strip_host: bool,

    /// Set `x-forwarded-host`, `x-forwarded-proto` and `x-forwarded-for`.
    pub forwarded_headers: bool,

    /// Scheme reported in `x-forwarded-proto`.
    /// Defaults to `https` when the listener terminates TLS, `http` otherwise.
    pub public_scheme: Option<String>,

    /// Largest inbound body buffered before forwarding, in bytes.
    pub max_body_bytes: usize,

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` for upstream calls.
    pub system_proxy: bool,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            strip_host: true,
            forwarded_headers: true,
            public_scheme: None,
            max_body_bytes: 10 * 1024 * 1024, // 10MB
            system_proxy: true,
        }
    }
}

/// Timeout configuration for upstream calls.
///
/// Both are unset by default, leaving the HTTP client's own behaviour in place.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: Option<u64>,

    /// Total upstream request timeout in seconds.
    pub upstream_secs: Option<u64>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Human readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "webhook_relay=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Source of the route table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Environment variable carrying the JSON route object.
    pub env_var: String,

    /// JSON route object used when the environment variable is unset.
    pub inline: Option<String>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_ROUTES_ENV.to_string(),
            inline: None,
        }
    }
}

impl RelayConfig {
    /// Scheme the relay is reachable under, as reported to upstreams.
    pub fn public_scheme(&self) -> &str {
        match &self.forwarding.public_scheme {
            Some(scheme) => scheme,
            None if self.listener.tls.is_some() => "https",
            None => "http",
        }
    }
}
