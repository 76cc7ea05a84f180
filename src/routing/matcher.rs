//! Path normalization for route lookup.
//!
//! # Design Decisions
//! - Only leading and trailing `/` are removed; internal slashes are kept
//! - Matching is case-sensitive and byte-exact after normalization
//! - Whitespace-only keys are never routable

/// Normalize a request path (or a configured key) into a route key.
///
/// Returns `None` when nothing routable remains.
pub fn route_key(path: &str) -> Option<&str> {
    let key = path.trim_start_matches('/').trim_end_matches('/');
    if key.trim().is_empty() {
        None
    } else {
        Some(key)
    }
}
