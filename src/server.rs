//! HTTP serving surface.
//!
//! Exposes the gate as a sidecar decision endpoint: the edge platform POSTs
//! the request envelope and receives the decision. The gate itself stays a
//! pure function over one request; this module is plumbing.

use crate::config::Config;
use crate::gate::EdgeGate;
use crate::request::{EdgeDecision, EdgeRequest};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The authentication gate.
    pub gate: Arc<EdgeGate>,
}

/// Builds the application router.
///
/// Routes:
/// - `POST /v1/decision` - one edge request in, one decision out
/// - `GET /healthz` - liveness check
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/v1/decision", post(decide))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
}

/// Runs one request through the gate.
#[instrument(skip(state, request), fields(correlation_id = %Uuid::new_v4()))]
async fn decide(
    State(state): State<AppState>,
    Json(request): Json<EdgeRequest>,
) -> Json<EdgeDecision> {
    let decision = state.gate.handle(request).await;
    match &decision {
        EdgeDecision::Forward { .. } => debug!(decision = "forward", "decision made"),
        EdgeDecision::Respond { response } => {
            debug!(decision = "respond", status = %response.status, "decision made");
        }
    }
    Json(decision)
}

/// Liveness check.
async fn healthz() -> &'static str {
    "ok"
}
