//! Scoreboard service infrastructure.
//!
//! Every scoreboard service process shares one backing store connection.
//! This crate owns that connection's lifecycle (configure, connect and
//! verify, share, close) and the process scaffolding around it.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod store;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{ConnectionConfig, KeyValueStore, StoreError, StoreHandle, StoreManager};
