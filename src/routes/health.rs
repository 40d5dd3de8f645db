use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::{AppState, storage::Store};

/// Liveness: the process is up and serving requests.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness: the configured storage backend answers.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let storage = state.store.backend();

    match state.store.check_health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "storage": storage })),
        ),
        Err(e) => {
            tracing::warn!(storage, error = %e, "storage health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "storage": storage })),
            )
        }
    }
}
