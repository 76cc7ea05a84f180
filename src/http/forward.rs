//! The forwarding operation: one inbound webhook in, one upstream call out.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → RouteTable::lookup(path)            no match → 404
//!     → headers::outbound_headers
//!     → buffer body (not for GET/HEAD)      too large → 413, broken → 400
//!     → reqwest (redirects not followed)    transport error → 502
//!     → response::relay (streamed back)
//! ```
//!
//! Every outcome is an HTTP response; nothing here fails the connection.
//! Dropping the returned future (caller went away) drops the in-flight
//! upstream request with it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use thiserror::Error;

use crate::config::RelayConfig;
use crate::http::headers::{outbound_headers, ForwardedContext};
use crate::http::request::{peer_addr, request_id};
use crate::http::response::{self, BODY_READ_ERROR, PAYLOAD_TOO_LARGE};
use crate::observability::metrics;
use crate::routing::RouteTable;

/// Failure of a single forwarding operation.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Inbound body exceeded the configured limit.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// Inbound body could not be read.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// The configured target cannot be used as a request URL.
    #[error("invalid target URL {target:?}: {source}")]
    InvalidTarget {
        target: String,
        source: url::ParseError,
    },

    /// The upstream could not be reached or the exchange failed.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ForwardError::BodyRead(_) => StatusCode::BAD_REQUEST,
            ForwardError::InvalidTarget { .. } | ForwardError::Upstream(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            ForwardError::BodyTooLarge { .. } | ForwardError::BodyRead(_) => "rejected",
            ForwardError::InvalidTarget { .. } | ForwardError::Upstream(_) => "upstream_error",
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        match self {
            ForwardError::BodyTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE).into_response()
            }
            ForwardError::BodyRead(_) => (StatusCode::BAD_REQUEST, BODY_READ_ERROR).into_response(),
            ForwardError::InvalidTarget { .. } | ForwardError::Upstream(_) => {
                response::upstream_error()
            }
        }
    }
}

/// Forwards webhooks to the upstreams named by the route table.
///
/// Cheap to share: the table is behind an `Arc` and the client is a pooled handle.
#[derive(Debug, Clone)]
pub struct Forwarder {
    routes: Arc<RouteTable>,
    client: reqwest::Client,
    strip_host: bool,
    forwarded_headers: bool,
    scheme: String,
    max_body_bytes: usize,
}

impl Forwarder {
    /// Build a forwarder and its outbound HTTP client.
    pub fn new(config: &RelayConfig, routes: Arc<RouteTable>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if !config.forwarding.system_proxy {
            builder = builder.no_proxy();
        }
        if let Some(secs) = config.timeouts.connect_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.timeouts.upstream_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            routes,
            client: builder.build()?,
            strip_host: config.forwarding.strip_host,
            forwarded_headers: config.forwarding.forwarded_headers,
            scheme: config.public_scheme().to_string(),
            max_body_bytes: config.forwarding.max_body_bytes,
        })
    }

    /// Relay one inbound request to its upstream.
    pub async fn forward(&self, request: Request<Body>) -> Response {
        let start_time = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let request_id = request_id(request.headers()).to_string();

        let Some(target) = self.routes.lookup(&path) else {
            tracing::warn!(request_id = %request_id, method = %method, path = %path, "No route matched");
            metrics::record_request(method.as_str(), StatusCode::NOT_FOUND.as_u16(), "not_found", start_time);
            return response::route_not_configured();
        };

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            target = %target,
            "Forwarding webhook"
        );

        match self.send(target, request).await {
            Ok(upstream) => {
                let status = upstream.status();
                tracing::info!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status = status.as_u16(),
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Webhook relayed"
                );
                metrics::record_request(method.as_str(), status.as_u16(), "relayed", start_time);
                response::relay(upstream, &request_id)
            }
            Err(err) => {
                let status = err.status();
                if status == StatusCode::BAD_GATEWAY {
                    tracing::error!(request_id = %request_id, target = %target, error = %err, "Upstream error");
                } else {
                    tracing::warn!(request_id = %request_id, path = %path, error = %err, "Rejected webhook body");
                }
                metrics::record_request(method.as_str(), status.as_u16(), err.outcome(), start_time);
                err.into_response()
            }
        }
    }

    /// Build the outbound request and wait for the upstream's response head.
    async fn send(
        &self,
        target: &str,
        request: Request<Body>,
    ) -> Result<reqwest::Response, ForwardError> {
        let url = reqwest::Url::parse(target).map_err(|source| ForwardError::InvalidTarget {
            target: target.to_string(),
            source,
        })?;

        let peer = peer_addr(&request);
        let (parts, body) = request.into_parts();
        let ctx = ForwardedContext {
            strip_host: self.strip_host,
            forwarded_headers: self.forwarded_headers,
            scheme: &self.scheme,
            authority: parts.uri.authority().map(|a| a.as_str()),
            peer,
        };
        let headers = outbound_headers(&parts.headers, &ctx);

        // Body is fully read before the upstream is contacted.
        let body = if carries_body(&parts.method) {
            read_body(body, self.max_body_bytes).await?
        } else {
            None
        };

        let mut outbound = self.client.request(parts.method, url).headers(headers);
        if let Some(bytes) = body {
            outbound = outbound.body(bytes);
        }

        Ok(outbound.send().await?)
    }
}

/// GET and HEAD never carry a forwarded body.
pub fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

/// Buffer the inbound body, `None` when it is empty.
async fn read_body(body: Body, limit: usize) -> Result<Option<Bytes>, ForwardError> {
    let collected = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(ForwardError::BodyTooLarge { limit });
        }
        Err(err) => return Err(ForwardError::BodyRead(err.to_string())),
    };

    Ok(if collected.is_empty() { None } else { Some(collected) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carries_body() {
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::HEAD));
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::PUT));
    }

    #[tokio::test]
    async fn test_read_body_empty_is_none() {
        let body = read_body(Body::empty(), 16).await.unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_read_body_exact_bytes() {
        let body = read_body(Body::from(r#"{"id":1}"#), 16).await.unwrap();
        assert_eq!(body.unwrap(), Bytes::from_static(br#"{"id":1}"#));
    }

    #[tokio::test]
    async fn test_read_body_over_limit() {
        let err = read_body(Body::from(vec![b'x'; 32]), 16).await.unwrap_err();
        assert!(matches!(err, ForwardError::BodyTooLarge { limit: 16 }));
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_error_status_mapping() {
        let err = ForwardError::InvalidTarget {
            target: "nope".into(),
            source: url::ParseError::RelativeUrlWithoutBase,
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);

        let err = ForwardError::BodyRead("reset".into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
