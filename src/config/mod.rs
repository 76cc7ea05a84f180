//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional) + CLI/env overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!
//! WEBHOOK_ROUTES (JSON object, or routes.inline)
//!     → loader::route_source
//!     → routing::RouteTable (parsed once, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Invalid process settings abort startup, a bad route table never does

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_or_default, route_source, ConfigError};
pub use schema::{
    ForwardingConfig, ListenerConfig, LogFormat, ObservabilityConfig, RelayConfig, RoutesConfig,
    TimeoutConfig, TlsConfig,
};
pub use validation::ValidationError;
