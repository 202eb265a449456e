//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a
//! scoreboard service process. All types derive Serde traits for
//! deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a scoreboard service process.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service name used in logs and the status endpoint.
    pub service_name: String,

    /// HTTP listener configuration.
    pub http: HttpConfig,

    /// Shared backing store connection settings (`redis.*` keys).
    pub redis: RedisConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: "room".to_string(),
            http: HttpConfig::default(),
            redis: RedisConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Backing store connection settings.
///
/// Port and database are kept signed so out-of-range values reach
/// validation with a precise message instead of failing deserialization.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Store host name or IP address.
    pub host: String,

    /// Store TCP port (1-65535).
    pub port: i64,

    /// Logical database index selected after connect.
    pub database: i64,

    /// Optional ACL user name.
    pub username: Option<String>,

    /// Optional credential. Absent means no AUTH is sent.
    pub password: Option<String>,

    /// Upper bound for connect + liveness probe, in milliseconds.
    pub probe_timeout_ms: u64,

    /// Upper bound for a single command, in milliseconds.
    pub command_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            database: 0,
            username: None,
            password: None,
            probe_timeout_ms: 3000,
            command_timeout_ms: 1000,
        }
    }
}

impl std::fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("probe_timeout_ms", &self.probe_timeout_ms)
            .field("command_timeout_ms", &self.command_timeout_ms)
            .finish()
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
