//! Store error types.

use std::time::Duration;

use thiserror::Error;

use crate::config::ValidationErrors;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Broad category of a [`StoreError`], used to pick a handling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad settings; detected before any network call.
    Configuration,
    /// Store unreachable, auth rejected or probe failed. Fatal at startup.
    Connectivity,
    /// Closing an already released connection. Logged only.
    Shutdown,
    /// A runtime command failed; the caller translates it.
    Operation,
}

/// Errors produced by the store connection manager and its handle.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store configuration: {0}")]
    InvalidConfig(#[from] ValidationErrors),

    #[error("cannot connect to store at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("authentication rejected by store at {endpoint}: {source}")]
    Auth {
        endpoint: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("liveness probe to {endpoint} timed out after {timeout:?}")]
    ProbeTimeout { endpoint: String, timeout: Duration },

    #[error("unexpected liveness probe reply: {0:?}")]
    UnexpectedProbeReply(String),

    #[error("store command failed: {0}")]
    Command(#[from] redis::RedisError),

    #[error("store command {op} timed out after {timeout:?}")]
    CommandTimeout { op: &'static str, timeout: Duration },

    #[error("store connection is closed")]
    Closed,

    #[error("store connection was already closed")]
    AlreadyClosed,

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Classify a failure seen while connecting or probing `endpoint`.
    pub(crate) fn connecting(endpoint: &str, source: redis::RedisError) -> Self {
        if source.kind() == redis::ErrorKind::AuthenticationFailed {
            StoreError::Auth {
                endpoint: endpoint.to_string(),
                source,
            }
        } else {
            StoreError::Connect {
                endpoint: endpoint.to_string(),
                source,
            }
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            StoreError::InvalidConfig(_) => ErrorClass::Configuration,
            StoreError::Connect { .. }
            | StoreError::Auth { .. }
            | StoreError::ProbeTimeout { .. }
            | StoreError::UnexpectedProbeReply(_) => ErrorClass::Connectivity,
            StoreError::AlreadyClosed => ErrorClass::Shutdown,
            StoreError::Command(_)
            | StoreError::CommandTimeout { .. }
            | StoreError::Closed
            | StoreError::Backend(_) => ErrorClass::Operation,
        }
    }

    /// True for errors that must stop a process from starting.
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self.class(),
            ErrorClass::Configuration | ErrorClass::Connectivity
        )
    }
}
