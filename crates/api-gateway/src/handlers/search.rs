//! Gig search pass-through controllers.
//!
//! The gateway adds nothing here: path, query string, and response bodies
//! travel to and from the auth service unchanged.

use crate::errors::GatewayError;
use crate::routes::AppState;
use axum::extract::{Path, RawQuery, State};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /api/gateway/v1/auth/search/gigs/:from/:size/:type
#[instrument(skip_all, name = "gateway.handlers.search.gigs")]
pub async fn search_gigs(
    State(state): State<Arc<AppState>>,
    Path((from, size, search_type)): Path<(String, String, String)>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, GatewayError> {
    let payload = state
        .auth_api
        .search_gigs(query.as_deref().unwrap_or(""), &from, &size, &search_type)
        .await?;

    Ok(Json(payload))
}

/// Handler for GET /api/gateway/v1/auth/search/gig/:gig_id
#[instrument(skip_all, name = "gateway.handlers.search.gig")]
pub async fn get_gig(
    State(state): State<Arc<AppState>>,
    Path(gig_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    let payload = state.auth_api.get_gig(&gig_id).await?;

    Ok(Json(payload))
}

/// Handler for GET /api/gateway/v1/auth/seed/:count
#[instrument(skip_all, name = "gateway.handlers.search.seed")]
pub async fn seed(
    State(state): State<Arc<AppState>>,
    Path(count): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    let payload = state.auth_api.seed(&count).await?;

    Ok(Json(payload))
}
