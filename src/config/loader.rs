//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationErrors};

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "SCOREBOARD_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable {var}: {message}")]
    Env { var: String, message: String },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Load and validate configuration from a TOML file.
///
/// Environment overrides are applied between parsing and validation.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ServiceConfig = toml::from_str(&content)?;
    finish(config)
}

/// Load from `path` when given, otherwise start from defaults.
pub fn load_service_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finish(ServiceConfig::default()),
    }
}

fn finish(config: ServiceConfig) -> Result<ServiceConfig, ConfigError> {
    let config = apply_env_overrides(config, |name| std::env::var(name).ok())?;
    validate_config(&config)?;
    Ok(config)
}

/// Apply `SCOREBOARD_*` overrides using `lookup` to read variables.
///
/// Supported variables:
/// - SCOREBOARD_SERVICE_NAME
/// - SCOREBOARD_HTTP_BIND_ADDRESS
/// - SCOREBOARD_REDIS_HOST
/// - SCOREBOARD_REDIS_PORT
/// - SCOREBOARD_REDIS_DATABASE
/// - SCOREBOARD_REDIS_USERNAME
/// - SCOREBOARD_REDIS_PASSWORD
/// - SCOREBOARD_REDIS_PROBE_TIMEOUT_MS
/// - SCOREBOARD_LOG_LEVEL
pub fn apply_env_overrides<F>(mut config: ServiceConfig, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| {
        let name = format!("{ENV_PREFIX}{suffix}");
        lookup(&name).map(|value| (name, value))
    };

    if let Some((_, value)) = var("SERVICE_NAME") {
        config.service_name = value;
    }
    if let Some((_, value)) = var("HTTP_BIND_ADDRESS") {
        config.http.bind_address = value;
    }
    if let Some((_, value)) = var("REDIS_HOST") {
        config.redis.host = value;
    }
    if let Some((name, value)) = var("REDIS_PORT") {
        config.redis.port = parse_number(&name, &value)?;
    }
    if let Some((name, value)) = var("REDIS_DATABASE") {
        config.redis.database = parse_number(&name, &value)?;
    }
    if let Some((_, value)) = var("REDIS_USERNAME") {
        config.redis.username = Some(value).filter(|v| !v.is_empty());
    }
    if let Some((_, value)) = var("REDIS_PASSWORD") {
        config.redis.password = Some(value).filter(|v| !v.is_empty());
    }
    if let Some((name, value)) = var("REDIS_PROBE_TIMEOUT_MS") {
        config.redis.probe_timeout_ms = parse_number(&name, &value)?;
    }
    if let Some((_, value)) = var("LOG_LEVEL") {
        config.observability.log_level = value;
    }

    Ok(config)
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var: name.to_string(),
        message: format!("expected an integer, got {value:?}"),
    })
}
