//! Validated connection parameters for the backing store.

use std::fmt;
use std::time::Duration;

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use crate::config::validation::{
    check_credentials, validate_redis, ValidationError, ValidationErrors,
};
use crate::config::RedisConfig;

/// Immutable, validated description of one store endpoint.
///
/// Can only be built through [`ConnectionConfig::new`] or from a
/// [`RedisConfig`], both of which reject malformed hosts, out-of-range ports
/// and negative database indexes.
#[derive(Clone)]
pub struct ConnectionConfig {
    host: String,
    port: u16,
    database: i64,
    username: Option<String>,
    password: Option<String>,
    probe_timeout: Duration,
    command_timeout: Duration,
}

impl ConnectionConfig {
    /// Build a config with default timeouts and no credential.
    pub fn new(host: impl Into<String>, port: i64, database: i64) -> Result<Self, ValidationErrors> {
        Self::try_from(&RedisConfig {
            host: host.into(),
            port,
            database,
            ..RedisConfig::default()
        })
    }

    /// Replace the credential. An empty password is treated as none.
    pub fn with_credentials(
        mut self,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, ValidationErrors> {
        let username = username.filter(|u| !u.is_empty());
        let password = password.filter(|p| !p.is_empty());
        check_credentials(username.as_deref(), password.as_deref())
            .map_err(|e| ValidationErrors(vec![e]))?;

        self.username = username;
        self.password = password;
        Ok(self)
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Result<Self, ValidationErrors> {
        self.probe_timeout = non_zero(timeout, "redis.probe_timeout_ms")?;
        Ok(self)
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Result<Self, ValidationErrors> {
        self.command_timeout = non_zero(timeout, "redis.command_timeout_ms")?;
        Ok(self)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database(&self) -> i64 {
        self.database
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn has_credentials(&self) -> bool {
        self.password.is_some()
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// `host:port`, with IPv6 literals bracketed. Safe to log.
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Client target including the credential. Never log this.
    pub(crate) fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: self.database,
                username: self.username.clone(),
                password: self.password.clone(),
                ..RedisConnectionInfo::default()
            },
        }
    }
}

impl TryFrom<&RedisConfig> for ConnectionConfig {
    type Error = ValidationErrors;

    fn try_from(config: &RedisConfig) -> Result<Self, Self::Error> {
        validate_redis(config)?;

        // validate_redis guarantees 1..=65535
        let port = u16::try_from(config.port).map_err(|_| {
            ValidationErrors(vec![ValidationError::PortOutOfRange {
                field: "redis.port",
                value: config.port,
            }])
        })?;

        Ok(Self {
            host: config.host.trim().to_string(),
            port,
            database: config.database,
            username: config.username.clone().filter(|u| !u.is_empty()),
            password: config.password.clone().filter(|p| !p.is_empty()),
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
            command_timeout: Duration::from_millis(config.command_timeout_ms),
        })
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint", &self.endpoint())
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("probe_timeout", &self.probe_timeout)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

fn non_zero(timeout: Duration, field: &'static str) -> Result<Duration, ValidationErrors> {
    if timeout.is_zero() {
        Err(ValidationErrors(vec![ValidationError::ZeroTimeout(field)]))
    } else {
        Ok(timeout)
    }
}
