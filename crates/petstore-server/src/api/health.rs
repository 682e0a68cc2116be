// ABOUTME: Liveness and readiness probes for the petstore server.
// ABOUTME: Readiness delegates to the store's own probe.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::app_state::SharedState;

/// GET /health/liveness - The process is up and routing requests.
pub async fn liveness() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// GET /health/readiness - The store can currently serve requests.
pub async fn readiness(State(state): State<SharedState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.with_store(|store| store.is_ready()).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))),
        Err(e) => {
            tracing::warn!("store not ready: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "status": "unavailable" })),
            )
        }
    }
}
