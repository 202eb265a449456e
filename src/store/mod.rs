//! Shared backing store subsystem.
//!
//! # Data Flow
//! ```text
//! config::RedisConfig
//!     → connection.rs (validated, immutable ConnectionConfig)
//!     → manager.rs (connect + liveness probe, fail fast)
//!     → handle.rs (StoreHandle shared by every request handler)
//!     → traits.rs (KeyValueStore capability seen by handlers)
//! ```
//!
//! # Design Decisions
//! - One multiplexed connection per process, no external locking
//! - No retries: startup fails fast, runtime errors go to the caller
//! - A connection the server dropped is redialed for the next command
//! - Handlers depend on `KeyValueStore`, so tests can swap in `MemoryStore`
//! - Shutdown is explicit and idempotent-safe; Drop is the fallback release

pub mod connection;
pub mod error;
pub mod handle;
pub mod manager;
pub mod memory;
pub mod traits;

pub use connection::ConnectionConfig;
pub use error::{ErrorClass, StoreError, StoreResult};
pub use handle::StoreHandle;
pub use manager::StoreManager;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;
