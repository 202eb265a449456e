//! In-process [`KeyValueStore`] for tests and local development.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::store::error::{StoreError, StoreResult};
use crate::store::traits::KeyValueStore;

/// A thread-safe map standing in for the backing store.
///
/// `set_available(false)` makes every call fail with [`StoreError::Closed`],
/// which is how handlers are tested against an unreachable store.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, String>>,
    available: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn check(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check()?;
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check()?;
        self.inner.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        self.check()?;
        Ok(self.inner.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.check()?;
        Ok(self.inner.contains_key(key))
    }

    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        self.check()?;
        let mut entry = self.inner.entry(key.to_string()).or_insert_with(|| "0".to_string());
        let current: i64 = entry
            .value()
            .parse()
            .map_err(|_| StoreError::Backend("value is not an integer or out of range".to_string()))?;
        let next = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::Backend("increment or decrement would overflow".to_string()))?;
        *entry.value_mut() = next.to_string();
        Ok(next)
    }

    fn endpoint(&self) -> String {
        "memory".to_string()
    }
}
