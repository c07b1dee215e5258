//! Email verification controller.

use crate::auth::BearerCredential;
use crate::errors::GatewayError;
use crate::handlers::auth::AuthFlowResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Handler for PUT /api/gateway/v1/auth/verify-email
#[instrument(skip_all, name = "gateway.handlers.verify_email")]
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<BearerCredential>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<Json<AuthFlowResponse>, GatewayError> {
    let response = state.auth_api.verify_email(&body.token, &credential).await?;

    Ok(Json(AuthFlowResponse {
        message: response.message.unwrap_or_default(),
        user: response.user,
    }))
}
