//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the service's handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Inject the shared store into handler state
//! - Serve until the shutdown broadcast fires, draining in-flight requests

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::request::{request_id, UuidRequestId};
use crate::lifecycle::shutdown;
use crate::store::KeyValueStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub service_name: Arc<str>,
}

/// HTTP server for a scoreboard service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server backed by `store`.
    pub fn new(config: &ServiceConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let state = AppState {
            store,
            service_name: Arc::from(config.service_name.as_str()),
        };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            .route("/status", get(handlers::status))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.http.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The configured router, for serving elsewhere or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain and return.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::X_REQUEST_ID;
    use crate::store::MemoryStore;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server(store: MemoryStore) -> HttpServer {
        HttpServer::new(&ServiceConfig::default(), Arc::new(store))
    }

    async fn get_json(router: Router, path: &str) -> (StatusCode, serde_json::Value, Option<String>) {
        let response = router
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let request_id = response
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap(), request_id)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body, request_id) = get_json(server(MemoryStore::new()).router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "room");
        assert!(request_id.is_some());
    }

    #[tokio::test]
    async fn test_ready_reflects_store_availability() {
        let store = MemoryStore::new();
        let server = server(store.clone());

        let (status, body, _) = get_json(server.router(), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");

        store.set_available(false);
        let (status, body, _) = get_json(server.router(), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_status() {
        let (status, body, _) = get_json(server(MemoryStore::new()).router(), "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store_endpoint"], "memory");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_client_request_id_is_propagated() {
        let response = server(MemoryStore::new())
            .router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(X_REQUEST_ID, "client-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "client-42");
    }
}
