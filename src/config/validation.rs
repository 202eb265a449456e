//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid, database index)
//! - Validate addresses before anything tries to bind or connect
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), ValidationErrors>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::{Ipv6Addr, SocketAddr};

use thiserror::Error;

use crate::config::schema::{RedisConfig, ServiceConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} must be between 1 and 65535, got {value}")]
    PortOutOfRange { field: &'static str, value: i64 },

    #[error("redis.database must not be negative, got {0}")]
    NegativeDatabase(i64),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("{field} is not a valid address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("redis.username requires redis.password")]
    UsernameWithoutPassword,
}

/// Every validation error found in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a complete service configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if config.service_name.trim().is_empty() {
        errors.push(ValidationError::Empty("service_name"));
    }

    if config.http.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "http.bind_address",
            value: config.http.bind_address.clone(),
        });
    }

    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("http.request_timeout_secs"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if let Err(redis_errors) = validate_redis(&config.redis) {
        errors.extend(redis_errors.0);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Validate the backing store section on its own.
pub fn validate_redis(redis: &RedisConfig) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    let host = redis.host.trim();
    if host.is_empty() {
        errors.push(ValidationError::Empty("redis.host"));
    } else if !is_plain_host(host) {
        errors.push(ValidationError::InvalidAddress {
            field: "redis.host",
            value: redis.host.clone(),
        });
    }

    if !(1..=65535).contains(&redis.port) {
        errors.push(ValidationError::PortOutOfRange {
            field: "redis.port",
            value: redis.port,
        });
    }

    if redis.database < 0 {
        errors.push(ValidationError::NegativeDatabase(redis.database));
    }

    if redis.probe_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("redis.probe_timeout_ms"));
    }

    if redis.command_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("redis.command_timeout_ms"));
    }

    if let Err(e) = check_credentials(redis.username.as_deref(), redis.password.as_deref()) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// A hostname or IP literal with nothing else attached.
///
/// Rejects anything carrying URL syntax (userinfo, path, query, fragment,
/// brackets) or a port. The only host allowed to contain `:` is a bare IPv6
/// literal.
pub(crate) fn is_plain_host(host: &str) -> bool {
    if host.contains(':') {
        return host.parse::<Ipv6Addr>().is_ok();
    }
    !host.is_empty()
        && !host
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "/?#@[]%\\".contains(c))
}

/// An ACL username is only sent together with a password.
pub(crate) fn check_credentials(
    username: Option<&str>,
    password: Option<&str>,
) -> Result<(), ValidationError> {
    let username = username.filter(|u| !u.is_empty());
    let password = password.filter(|p| !p.is_empty());
    if username.is_some() && password.is_none() {
        Err(ValidationError::UsernameWithoutPassword)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.redis.host = String::new();
        config.redis.port = 70000;
        config.redis.database = -1;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.errors().len(), 3);
        assert!(errors.contains(&ValidationError::Empty("redis.host")));
        assert!(errors.contains(&ValidationError::PortOutOfRange {
            field: "redis.port",
            value: 70000
        }));
        assert!(errors.contains(&ValidationError::NegativeDatabase(-1)));
    }

    #[test]
    fn test_port_bounds() {
        let mut redis = RedisConfig::default();
        redis.port = 0;
        assert!(validate_redis(&redis).is_err());
        redis.port = 65535;
        assert!(validate_redis(&redis).is_ok());
        redis.port = 1;
        assert!(validate_redis(&redis).is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut redis = RedisConfig::default();
        redis.probe_timeout_ms = 0;
        redis.command_timeout_ms = 0;
        let errors = validate_redis(&redis).unwrap_err();
        assert_eq!(errors.errors().len(), 2);
    }

    #[test]
    fn test_host_with_url_syntax_rejected() {
        for host in [
            "127.0.0.1#",
            "127.0.0.1?x",
            "user@127.0.0.1",
            "cache/1",
            "cache internal",
            "127.0.0.1:7000",
            "[::1]",
            "cache%20",
        ] {
            let redis = RedisConfig {
                host: host.to_string(),
                ..RedisConfig::default()
            };
            let errors = validate_redis(&redis).unwrap_err();
            assert!(
                errors.contains(&ValidationError::InvalidAddress {
                    field: "redis.host",
                    value: host.to_string(),
                }),
                "host {:?} should be rejected",
                host
            );
        }
    }

    #[test]
    fn test_plain_hosts_accepted() {
        for host in ["localhost", "10.0.0.7", "cache.internal", "::1", "fe80::1", " redis "] {
            let redis = RedisConfig {
                host: host.to_string(),
                ..RedisConfig::default()
            };
            assert!(validate_redis(&redis).is_ok(), "host {:?} should be accepted", host);
        }
    }

    #[test]
    fn test_username_requires_password() {
        let mut redis = RedisConfig {
            username: Some("scores".into()),
            ..RedisConfig::default()
        };
        let errors = validate_redis(&redis).unwrap_err();
        assert!(errors.contains(&ValidationError::UsernameWithoutPassword));

        redis.password = Some(String::new());
        assert!(validate_redis(&redis).is_err());

        redis.password = Some("secret".into());
        assert!(validate_redis(&redis).is_ok());

        redis.username = None;
        assert!(validate_redis(&redis).is_ok());
    }

    #[test]
    fn test_bad_bind_address() {
        let mut config = ServiceConfig::default();
        config.http.bind_address = "not-an-address".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors.to_string(),
            "http.bind_address is not a valid address: not-an-address"
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
