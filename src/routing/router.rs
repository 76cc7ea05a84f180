//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Parse the JSON route object supplied at startup
//! - Look up the upstream URL for a request path
//! - Return the target or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) lookup via HashMap on the normalized key
//! - A broken table degrades to empty instead of failing startup

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::routing::matcher::route_key;

/// Why a route table value could not be used.
#[derive(Debug, Error)]
pub enum RouteTableError {
    /// The value is not valid JSON.
    #[error("route table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The value is valid JSON but not an object.
    #[error("route table must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Immutable mapping from route key to upstream URL.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, String>,
}

impl RouteTable {
    /// An empty table; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a JSON object of `route key → upstream URL`.
    ///
    /// Entries with an unroutable key or a non-string/empty value are skipped.
    /// Entries are visited in document order, so when two keys normalize to
    /// the same route key the earlier one is kept.
    pub fn from_json(raw: &str) -> Result<Self, RouteTableError> {
        let value: Value = serde_json::from_str(raw)?;
        let entries = match value {
            Value::Object(entries) => entries,
            other => return Err(RouteTableError::NotAnObject(json_kind(&other))),
        };

        let mut routes = HashMap::with_capacity(entries.len());
        for (raw_key, target) in entries {
            let Some(key) = route_key(&raw_key) else {
                tracing::warn!(key = %raw_key, "Skipping route with empty key");
                continue;
            };

            let target = match target {
                Value::String(target) if !target.is_empty() => target,
                other => {
                    tracing::warn!(
                        key = %key,
                        kind = json_kind(&other),
                        "Skipping route without a non-empty string target"
                    );
                    continue;
                }
            };

            if url::Url::parse(&target).is_err() {
                tracing::warn!(
                    key = %key,
                    target = %target,
                    "Route target is not an absolute URL; requests to it will fail upstream"
                );
            }

            if let Some(existing) = routes.get(key) {
                tracing::warn!(
                    key = %key,
                    kept = %existing,
                    ignored = %target,
                    "Duplicate route key after normalization"
                );
                continue;
            }

            routes.insert(key.to_string(), target);
        }

        Ok(Self { routes })
    }

    /// Build the table from the startup configuration value.
    ///
    /// Never fails: a missing, malformed or non-object value yields an empty
    /// table and is logged.
    pub fn from_config_value(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            tracing::warn!("No route table configured; every webhook path will return 404");
            return Self::empty();
        };

        match Self::from_json(raw) {
            Ok(table) => {
                tracing::info!(routes = table.len(), "Route table loaded");
                table
            }
            Err(err @ RouteTableError::Json(_)) => {
                tracing::error!(error = %err, "Failed to parse route table, ignoring");
                Self::empty()
            }
            Err(err @ RouteTableError::NotAnObject(_)) => {
                tracing::warn!(error = %err, "Route table is not an object, ignoring");
                Self::empty()
            }
        }
    }

    /// Resolve a request path to its upstream URL.
    pub fn lookup(&self, pathname: &str) -> Option<&str> {
        let key = route_key(pathname)?;
        self.routes.get(key).map(String::as_str)
    }

    /// Number of usable routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes sorted by key.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .routes
            .iter()
            .map(|(key, target)| (key.as_str(), target.as_str()))
            .collect();
        entries.sort_unstable();
        entries
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTES: &str = r#"{
        "golden-deal/notion-match-form": "https://myapp.com/api/notion-webhook",
        "stripe/webhook": "https://myapp.com/api/stripe-webhook"
    }"#;

    #[test]
    fn test_lookup_normalized_variants() {
        let table = RouteTable::from_json(ROUTES).unwrap();
        let expected = Some("https://myapp.com/api/stripe-webhook");

        assert_eq!(table.lookup("stripe/webhook"), expected);
        assert_eq!(table.lookup("/stripe/webhook"), expected);
        assert_eq!(table.lookup("stripe/webhook/"), expected);
        assert_eq!(table.lookup("/stripe/webhook/"), expected);
        assert_eq!(
            table.lookup("/golden-deal/notion-match-form"),
            Some("https://myapp.com/api/notion-webhook")
        );
    }

    #[test]
    fn test_lookup_miss() {
        let table = RouteTable::from_json(ROUTES).unwrap();
        assert_eq!(table.lookup("/stripe"), None);
        assert_eq!(table.lookup("/Stripe/Webhook"), None);
        assert_eq!(table.lookup("/stripe/webhook/extra"), None);
    }

    #[test]
    fn test_lookup_empty_and_whitespace_path() {
        let table = RouteTable::from_json(r#"{" ": "https://up.example/blank"}"#).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.lookup(""), None);
        assert_eq!(table.lookup("/"), None);
        assert_eq!(table.lookup(" "), None);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = RouteTable::from_json("{not json").unwrap_err();
        assert!(matches!(err, RouteTableError::Json(_)));
    }

    #[test]
    fn test_non_object_is_error() {
        for (raw, kind) in [
            ("[]", "an array"),
            (r#""a/b""#, "a string"),
            ("42", "a number"),
            ("null", "null"),
            ("true", "a boolean"),
        ] {
            match RouteTable::from_json(raw) {
                Err(RouteTableError::NotAnObject(found)) => assert_eq!(found, kind),
                other => panic!("expected NotAnObject for {raw}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_config_value_degrades_to_empty() {
        for raw in [None, Some("{oops"), Some("[1,2]"), Some("\"x\""), Some("7")] {
            let table = RouteTable::from_config_value(raw);
            assert!(table.is_empty());
            assert_eq!(table.lookup("/anything"), None);
        }
    }

    #[test]
    fn test_skips_unusable_targets() {
        let table = RouteTable::from_json(
            r#"{
                "empty": "",
                "number": 5,
                "nested": {"url": "https://up.example"},
                "ok": "https://up.example/ok"
            }"#,
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("/empty"), None);
        assert_eq!(table.lookup("/number"), None);
        assert_eq!(table.lookup("/nested"), None);
        assert_eq!(table.lookup("/ok"), Some("https://up.example/ok"));
    }

    #[test]
    fn test_keeps_malformed_url_string() {
        let table = RouteTable::from_json(r#"{"bad": "not a url"}"#).unwrap();
        assert_eq!(table.lookup("/bad"), Some("not a url"));
    }

    #[test]
    fn test_duplicate_normalized_key_keeps_first_in_document() {
        let table = RouteTable::from_json(
            r#"{"a": "https://first.example", "/a": "https://second.example"}"#,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("/a"), Some("https://first.example"));

        let table = RouteTable::from_json(
            r#"{"/a/": "https://first.example", "a": "https://second.example"}"#,
        )
        .unwrap();
        assert_eq!(table.lookup("a"), Some("https://first.example"));
    }

    #[test]
    fn test_configured_keys_are_normalized() {
        let table = RouteTable::from_json(r#"{"/a/b/": "https://up.example/x"}"#).unwrap();
        assert_eq!(table.lookup("/a/b"), Some("https://up.example/x"));
        assert_eq!(table.entries(), vec![("a/b", "https://up.example/x")]);
    }
}
