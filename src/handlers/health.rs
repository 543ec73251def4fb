// handlers/health.rs - service banner and health check

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Invoice API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - liveness probe backed by a database ping
///
/// 200 `{ "status": "ok", "timestamp": "...", "database": "ok" }`, or 503
/// SERVICE_UNAVAILABLE when the ping fails or times out.
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let now = chrono::Utc::now();

    match state.db.ping().await {
        Ok(()) => Ok(Json(json!({
            "status": "ok",
            "timestamp": now,
            "database": "ok"
        }))),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            Err(ApiError::service_unavailable("Database unavailable"))
        }
    }
}
