use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub service: String,
    pub version: &'static str,
    pub store_endpoint: String,
}

/// Process liveness. Does not touch the store.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    metrics::record_request("/health", 200);
    Json(HealthResponse {
        status: "ok",
        service: state.service_name.to_string(),
    })
}

/// Readiness: one round trip to the shared store.
pub async fn ready(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<ReadyResponse>) {
    match state.store.ping().await {
        Ok(()) => {
            metrics::record_request("/ready", 200);
            (
                StatusCode::OK,
                Json(ReadyResponse {
                    status: "ready",
                    error: None,
                }),
            )
        }
        Err(e) => {
            tracing::warn!(
                request_id = %request_id(&headers),
                endpoint = %state.store.endpoint(),
                error = %e,
                "Readiness check failed"
            );
            metrics::record_request("/ready", 503);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    status: "unavailable",
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    metrics::record_request("/status", 200);
    Json(StatusResponse {
        service: state.service_name.to_string(),
        version: env!("CARGO_PKG_VERSION"),
        store_endpoint: state.store.endpoint(),
    })
}
