//! Header manipulation for both legs of a relayed webhook.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Drop `host` so the client derives it from the target URL
//! - Add X-Forwarded-Host, X-Forwarded-Proto, X-Forwarded-For
//!
//! # Design Decisions
//! - `HeaderMap` keeps duplicate values and is case-insensitive on names
//! - Framing headers (`content-length`, `transfer-encoding`) are recomputed by
//!   the transport on each leg, never copied

use std::net::SocketAddr;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Headers that only describe a single connection leg.
pub const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
];

pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// What the outbound leg should know about the inbound one.
#[derive(Debug, Clone, Copy)]
pub struct ForwardedContext<'a> {
    /// Drop the inbound `host` header.
    pub strip_host: bool,
    /// Emit `x-forwarded-*` headers.
    pub forwarded_headers: bool,
    /// Scheme the relay is served under.
    pub scheme: &'a str,
    /// Authority from the request URI, used when no `host` header is present (HTTP/2).
    pub authority: Option<&'a str>,
    /// Address of the connected peer, when known.
    pub peer: Option<SocketAddr>,
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
}

/// Build the header set sent to the upstream from the inbound headers.
pub fn outbound_headers(inbound: &HeaderMap, ctx: &ForwardedContext<'_>) -> HeaderMap {
    let mut headers = inbound.clone();
    strip_hop_by_hop(&mut headers);

    let original_host = inbound
        .get(header::HOST)
        .cloned()
        .or_else(|| ctx.authority.and_then(|a| HeaderValue::from_str(a).ok()));

    if ctx.strip_host {
        headers.remove(header::HOST);
    }

    if ctx.forwarded_headers {
        if let Some(host) = original_host {
            headers.insert(X_FORWARDED_HOST, host);
        }
        if let Ok(proto) = HeaderValue::from_str(ctx.scheme) {
            headers.insert(X_FORWARDED_PROTO, proto);
        }
        if let Some(peer) = ctx.peer {
            append_forwarded_for(&mut headers, peer);
        }
    }

    headers
}

/// Build the header set returned to the caller from the upstream headers.
///
/// Drops the same hop-by-hop set as the request leg, including headers the
/// upstream names in `Connection`.
pub fn relayed_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    strip_hop_by_hop(&mut headers);
    headers
}

fn append_forwarded_for(headers: &mut HeaderMap, peer: SocketAddr) {
    let ip = peer.ip().to_string();
    let value = match headers
        .get(&X_FORWARDED_FOR)
        .and_then(|existing| existing.to_str().ok())
    {
        Some(existing) if !existing.trim().is_empty() => format!("{existing}, {ip}"),
        _ => ip,
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
