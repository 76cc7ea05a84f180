//! Webhook relay library.
//!
//! Forwards webhooks arriving on stable public paths to upstream URLs taken
//! from a route table loaded once at startup.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
