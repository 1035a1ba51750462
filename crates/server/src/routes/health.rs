//! Liveness and readiness endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use crate::state::AppState;

/// Service name reported by the liveness endpoint.
pub const SERVICE_NAME: &str = "xmas-events";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/health/ready", get(readiness))
}

/// Liveness health check endpoint.
///
/// Does not check dependencies.
async fn health() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(json!({
            "ok": true,
            "service": SERVICE_NAME,
            "ts": chrono::Utc::now().timestamp_millis(),
        })),
    )
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the installation store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
