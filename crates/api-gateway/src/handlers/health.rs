//! Gateway health handler.

use crate::routes::AppState;
use axum::extract::State;
use std::sync::Arc;
use tracing::instrument;

/// Liveness message of the public contract.
const HEALTH_MESSAGE: &str = "API Gateway service is healthy and OK.";

/// Handler for GET /gateway-health
///
/// Liveness only: the gateway answers healthy as soon as it can serve
/// requests. Search readiness is observability state and does not gate the
/// response; it is logged when still pending.
#[instrument(skip_all, name = "gateway.handlers.health")]
pub async fn gateway_health(State(state): State<Arc<AppState>>) -> &'static str {
    if !*state.search_ready.borrow() {
        tracing::debug!(
            target: "gateway.handlers.health",
            "Search dependency not yet reachable"
        );
    }

    HEALTH_MESSAGE
}
