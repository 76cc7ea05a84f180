//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{RelayConfig, RoutesConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from the TOML file at `path` if given,
/// otherwise start from defaults.
///
/// `bind_override` replaces `listener.bind_address` before validation.
pub fn load_or_default(
    path: Option<&Path>,
    bind_override: Option<&str>,
) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RelayConfig::default(),
    };

    if let Some(bind) = bind_override {
        config.listener.bind_address = bind.to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Raw JSON route object for this process.
///
/// The environment variable wins; `routes.inline` is the fallback.
/// `None` means no route table was supplied at all.
pub fn route_source(routes: &RoutesConfig) -> Option<String> {
    match std::env::var(&routes.env_var) {
        Ok(raw) => Some(raw),
        Err(std::env::VarError::NotPresent) => routes.inline.clone(),
        Err(std::env::VarError::NotUnicode(_)) => {
            tracing::error!(
                env_var = %routes.env_var,
                "Route table variable is not valid UTF-8, ignoring"
            );
            routes.inline.clone()
        }
    }
}
