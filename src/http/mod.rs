//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → forward.rs (route lookup, outbound request, upstream call)
//!         → headers.rs (hop-by-hop stripping, x-forwarded-*)
//!         → request.rs (request ID, peer address)
//!     → response.rs (relay upstream response, fixed error responses)
//!     → Send to client
//! ```

pub mod forward;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use request::X_REQUEST_ID;
pub use server::{HttpServer, ServerError};
