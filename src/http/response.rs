//! Response handling and transformation.
//!
//! # Responsibilities
//! - Rebuild the upstream response for the caller
//! - Strip hop-by-hop headers from the upstream response
//! - Stream the upstream body without buffering it
//! - Produce the relay's own fixed responses (404, 502, ...)

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;

use crate::http::headers::relayed_headers;

pub const ROUTE_NOT_CONFIGURED: &str = "Webhook route not configured";
pub const UPSTREAM_ERROR: &str = "Upstream webhook target error";
pub const PAYLOAD_TOO_LARGE: &str = "Webhook payload too large";
pub const BODY_READ_ERROR: &str = "Failed to read webhook request body";

/// 404 for paths with no configured route.
pub fn route_not_configured() -> Response {
    (StatusCode::NOT_FOUND, ROUTE_NOT_CONFIGURED).into_response()
}

/// 502 for any failure reaching the upstream.
pub fn upstream_error() -> Response {
    (StatusCode::BAD_GATEWAY, UPSTREAM_ERROR).into_response()
}

/// Turn an upstream response into the response sent to the caller.
///
/// Status, reason phrase (when the client kept a non-canonical one), headers
/// and body are carried over; the body is streamed as it arrives.
pub fn relay(upstream: reqwest::Response, request_id: &str) -> Response {
    let status = upstream.status();
    let headers = relayed_headers(upstream.headers());
    let reason = upstream
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .cloned();

    let request_id = request_id.to_string();
    let body = upstream.bytes_stream().inspect_err(move |e| {
        tracing::warn!(request_id = %request_id, error = %e, "Upstream body ended early");
    });

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    if let Some(reason) = reason {
        response.extensions_mut().insert(reason);
    }
    response
}
