//! The key-value capability that request handlers depend on.

use async_trait::async_trait;

use crate::store::error::StoreResult;

/// Key-value operations available to request handlers.
///
/// Implementations must be safe to share across tasks without external
/// locking. [`StoreHandle`](crate::store::StoreHandle) talks to the real
/// store; [`MemoryStore`](crate::store::MemoryStore) is an in-process fake.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Round-trip liveness check.
    async fn ping(&self) -> StoreResult<()>;

    /// Get a value by key, `None` if absent.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store a value under key, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete a key. Returns true if it existed.
    async fn del(&self, key: &str) -> StoreResult<bool>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Add `delta` to an integer value (missing keys count as 0) and return the result.
    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64>;

    /// Human-readable location of the store, for logs and status output.
    fn endpoint(&self) -> String;
}
