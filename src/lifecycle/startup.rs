//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Connect the shared store and verify it (fail fast)
//! - Bind the listener and serve until asked to stop
//! - Close the store only after the server has stopped
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned and the caller exits non-zero
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::future::Future;
use std::net::SocketAddr;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::store::{ConnectionConfig, StoreError, StoreManager};

/// Errors that prevent a service process from starting or serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] BuildError),
}

/// Run the service: store first, then bind `http.bind_address`, serve until
/// `stop` resolves, then close the store.
pub async fn run<S>(config: ServiceConfig, stop: S) -> Result<(), StartupError>
where
    S: Future<Output = ()> + Send + 'static,
{
    start_metrics(&config)?;
    let store = connect_store(&config).await?;

    let listener = TcpListener::bind(&config.http.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.http.bind_address.clone(),
            source,
        })?;

    serve(config, store, listener, stop).await
}

/// Same as [`run`] but serves on an already bound listener.
pub async fn run_with_listener<S>(
    config: ServiceConfig,
    listener: TcpListener,
    stop: S,
) -> Result<(), StartupError>
where
    S: Future<Output = ()> + Send + 'static,
{
    start_metrics(&config)?;
    let store = connect_store(&config).await?;
    serve(config, store, listener, stop).await
}

/// Validate the `redis` section and initialize the store manager.
pub async fn connect_store(config: &ServiceConfig) -> Result<StoreManager, StoreError> {
    let connection = ConnectionConfig::try_from(&config.redis)?;
    StoreManager::initialize(connection).await
}

fn start_metrics(config: &ServiceConfig) -> Result<(), StartupError> {
    if !config.observability.metrics_enabled {
        return Ok(());
    }
    match config.observability.metrics_address.parse::<SocketAddr>() {
        Ok(addr) => Ok(metrics::init_metrics(addr)?),
        Err(_) => {
            // validation already rejects this; tolerate configs built in code
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address, metrics disabled"
            );
            Ok(())
        }
    }
}

async fn serve<S>(
    config: ServiceConfig,
    store: StoreManager,
    listener: TcpListener,
    stop: S,
) -> Result<(), StartupError>
where
    S: Future<Output = ()> + Send + 'static,
{
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = tokio::spawn(async move {
        stop.await;
        tracing::info!("Shutdown requested, draining HTTP server");
        shutdown.trigger();
    });

    let server = HttpServer::new(&config, store.shared());
    let served = server.run(listener, server_shutdown).await;
    trigger.abort();

    // The server has stopped accepting and drained; only now release the store.
    if let Err(e) = store.shutdown() {
        tracing::warn!(error = %e, "Store shutdown failed");
    }

    served.map_err(StartupError::Serve)?;
    tracing::info!(service = %config.service_name, "Shutdown complete");
    Ok(())
}
