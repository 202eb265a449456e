//! Connection lifecycle for the shared backing store.
//!
//! # Lifecycle
//! ```text
//! ConnectionConfig
//!     → initialize()  connect + PING under one deadline, no retry
//!     → (running)     a dropped connection is redialed on the next command
//!     → get()         same StoreHandle for every caller
//!     → shutdown()    release once; later calls report AlreadyClosed
//!     → Drop          releases the connection if shutdown() never ran
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use redis::aio::{ConnectionManager, ConnectionManagerConfig};

use crate::observability::metrics;
use crate::resilience::with_deadline;
use crate::store::connection::ConnectionConfig;
use crate::store::error::{StoreError, StoreResult};
use crate::store::handle::StoreHandle;
use crate::store::traits::KeyValueStore;

/// Owner of the process-wide store connection.
///
/// Built once on the startup path and passed to whatever constructs the
/// request servers. There is no global: holding a `StoreManager` is proof
/// that initialization succeeded.
pub struct StoreManager {
    handle: StoreHandle,
    config: ConnectionConfig,
}

impl StoreManager {
    /// Connect to the store and verify it answers `PING`.
    ///
    /// Connect, AUTH/SELECT handshake and the probe share a single
    /// `probe_timeout` budget. Any failure is returned to the caller; deciding
    /// to abort the process is the startup routine's job.
    pub async fn initialize(config: ConnectionConfig) -> StoreResult<Self> {
        let endpoint = config.endpoint();
        let timeout = config.probe_timeout();

        tracing::info!(
            endpoint = %endpoint,
            database = config.database(),
            authenticated = config.has_credentials(),
            probe_timeout_ms = timeout.as_millis() as u64,
            "Connecting to store"
        );

        let client = redis::Client::open(config.connection_info())
            .map_err(|e| StoreError::connecting(&endpoint, e))?;
        let setup = manager_config(timeout, config.command_timeout());

        let start = Instant::now();
        let probe_failed = |e: redis::RedisError| {
            if e.is_timeout() {
                StoreError::ProbeTimeout {
                    endpoint: endpoint.clone(),
                    timeout,
                }
            } else {
                StoreError::connecting(&endpoint, e)
            }
        };
        let probe = async {
            let mut conn = ConnectionManager::new_with_config(client, setup)
                .await
                .map_err(probe_failed)?;
            let reply: String = redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(probe_failed)?;
            if reply != "PONG" {
                return Err(StoreError::UnexpectedProbeReply(reply));
            }
            Ok::<_, StoreError>(conn)
        };

        let result = with_deadline(timeout, probe, || StoreError::ProbeTimeout {
            endpoint: endpoint.clone(),
            timeout,
        })
        .await;
        metrics::record_store_probe(result.is_ok(), start);

        let conn = result?;
        metrics::record_store_connected(true);
        tracing::info!(
            endpoint = %endpoint,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Store connection established"
        );

        Ok(Self {
            handle: StoreHandle::new(conn, endpoint, config.command_timeout()),
            config,
        })
    }

    /// The shared handle. Every call returns the same instance.
    pub fn get(&self) -> &StoreHandle {
        &self.handle
    }

    /// The handle as the capability trait, for dependency injection.
    pub fn shared(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(self.handle.clone())
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Release the connection.
    ///
    /// Must run after the request servers have stopped. A second call returns
    /// [`StoreError::AlreadyClosed`], which callers log and ignore.
    pub fn shutdown(&self) -> StoreResult<()> {
        if self.handle.close() {
            metrics::record_store_connected(false);
            tracing::info!(endpoint = %self.config.endpoint(), "Store connection closed");
            Ok(())
        } else {
            Err(StoreError::AlreadyClosed)
        }
    }
}

/// The first dial is attempted exactly once; later redials after a dropped
/// connection are bounded by the same timeouts.
fn manager_config(connect_timeout: Duration, response_timeout: Duration) -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_number_of_retries(0)
        .set_connection_timeout(connect_timeout)
        .set_response_timeout(response_timeout)
}

impl Drop for StoreManager {
    fn drop(&mut self) {
        if self.handle.close() {
            metrics::record_store_connected(false);
            tracing::debug!(
                endpoint = %self.config.endpoint(),
                "Store connection released on drop"
            );
        }
    }
}

impl std::fmt::Debug for StoreManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreManager")
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish()
    }
}
