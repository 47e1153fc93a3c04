//! HTTP handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::error;

use runwatch_metrics::prometheus::CONTENT_TYPE;

use crate::ApiState;

/// Error body returned on failure.
#[derive(serde::Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: msg.to_string(),
        }),
    )
}

// ── Runs ───────────────────────────────────────────────────────

/// GET /action-runs
pub async fn list_action_runs(State(state): State<ApiState>) -> impl IntoResponse {
    match state.source.fetch_all().await {
        Ok(runs) => Json(runs).into_response(),
        Err(e) => {
            error!(error = %e, "failed to get action runs");
            error_response("internal server error", StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
        }
    }
}

// ── Prometheus ─────────────────────────────────────────────────

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let body = runwatch_metrics::render_prometheus(&state.counters);
    (StatusCode::OK, [("content-type", CONTENT_TYPE)], body)
}
