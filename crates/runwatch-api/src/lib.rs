//! runwatch-api — HTTP surface for runwatch.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/action-runs` | Every run in the store, as JSON |
//! | GET | `/metrics` | Prometheus exposition of the run counters |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use runwatch_metrics::CounterRegistry;
use runwatch_state::RecordSource;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub source: Arc<dyn RecordSource>,
    pub counters: Arc<CounterRegistry>,
}

/// Build the router.
pub fn build_router(source: Arc<dyn RecordSource>, counters: Arc<CounterRegistry>) -> Router {
    let state = ApiState { source, counters };

    Router::new()
        .route("/action-runs", get(handlers::list_action_runs))
        .route("/metrics", get(handlers::prometheus_metrics))
        .with_state(state)
}
