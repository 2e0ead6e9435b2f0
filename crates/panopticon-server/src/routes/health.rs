use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// `GET /health`: can the service still record reports?
///
/// Pings the stats store (a `SELECT 1` on the DuckDB connection). `200` with
/// `"status": "ok"` when it answers, `503` with `"status": "degraded"` when it
/// does not. Pushes would fail with `500` in the degraded state, so container
/// orchestrators should restart on it.
#[tracing::instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, label) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            let cause = format!("{e:#}");
            tracing::error!(error = %cause, "Stats store did not answer ping");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };
    (
        status,
        Json(json!({
            "status": label,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// `GET /test`: plain `ok` so a homeserver admin can check reachability.
pub async fn reachable() -> &'static str {
    "ok"
}
