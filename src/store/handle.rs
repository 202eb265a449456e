//! Shared client handle for the backing store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, FromRedisValue};

use crate::observability::metrics;
use crate::resilience::with_deadline;
use crate::store::error::{StoreError, StoreResult};
use crate::store::traits::KeyValueStore;

/// A cheap-to-clone handle to the process-wide store connection.
///
/// All clones share one multiplexed connection; concurrent commands are
/// pipelined over it without external locking. A command that fails because
/// the server dropped the connection returns its error, and the next command
/// runs on a freshly dialed connection. Once the owning
/// [`StoreManager`](crate::store::StoreManager) shuts down, every clone
/// returns [`StoreError::Closed`].
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    connection: ArcSwapOption<ConnectionManager>,
    endpoint: String,
    command_timeout: Duration,
}

impl StoreHandle {
    pub(crate) fn new(connection: ConnectionManager, endpoint: String, command_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                connection: ArcSwapOption::from_pointee(connection),
                endpoint,
                command_timeout,
            }),
        }
    }

    /// True if both handles refer to the same underlying connection slot.
    pub fn same_instance(&self, other: &StoreHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.connection.load().is_none()
    }

    pub fn command_timeout(&self) -> Duration {
        self.inner.command_timeout
    }

    /// Run an arbitrary command under the command timeout.
    pub async fn query<T: FromRedisValue>(&self, cmd: &redis::Cmd) -> StoreResult<T> {
        let mut conn = self.connection()?;
        self.bounded("query", async move {
            Ok::<_, StoreError>(cmd.query_async(&mut conn).await?)
        })
        .await
    }

    /// Release the connection. Returns false if it was already released.
    ///
    /// Commands already holding a clone of the connection finish normally;
    /// the socket closes when the last clone is dropped.
    pub(crate) fn close(&self) -> bool {
        self.inner.connection.swap(None).is_some()
    }

    fn connection(&self) -> StoreResult<ConnectionManager> {
        self.inner
            .connection
            .load_full()
            .map(|conn| (*conn).clone())
            .ok_or(StoreError::Closed)
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> StoreResult<T>
    where
        F: std::future::Future<Output = StoreResult<T>>,
    {
        let start = Instant::now();
        let timeout = self.inner.command_timeout;
        let result = with_deadline(timeout, fut, || StoreError::CommandTimeout { op, timeout }).await;

        metrics::record_store_command(op, result.is_ok(), start);
        if let Err(e) = &result {
            tracing::debug!(op, endpoint = %self.inner.endpoint, error = %e, "Store command failed");
        }
        result
    }
}

#[async_trait]
impl KeyValueStore for StoreHandle {
    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.connection()?;
        let reply: String = self
            .bounded("ping", async move {
                Ok::<_, StoreError>(redis::cmd("PING").query_async(&mut conn).await?)
            })
            .await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(StoreError::UnexpectedProbeReply(reply))
        }
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.connection()?;
        self.bounded("get", async move { Ok::<_, StoreError>(conn.get(key).await?) })
            .await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.connection()?;
        self.bounded("set", async move {
            let _: () = conn.set(key, value).await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.connection()?;
        self.bounded("del", async move {
            let removed: i64 = conn.del(key).await?;
            Ok::<_, StoreError>(removed > 0)
        })
        .await
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.connection()?;
        self.bounded("exists", async move { Ok::<_, StoreError>(conn.exists(key).await?) })
            .await
    }

    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        let mut conn = self.connection()?;
        self.bounded("incr_by", async move { Ok::<_, StoreError>(conn.incr(key, delta).await?) })
            .await
    }

    fn endpoint(&self) -> String {
        self.inner.endpoint.clone()
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("endpoint", &self.inner.endpoint)
            .field("closed", &self.is_closed())
            .field("command_timeout", &self.inner.command_timeout)
            .finish()
    }
}
