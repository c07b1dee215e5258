//! Identity-required controllers: current user, resend email, refresh token.
//!
//! All three run behind both session gates, so the caller's credential is
//! guaranteed to be attached by the time a handler body executes.

use crate::auth::BearerCredential;
use crate::errors::GatewayError;
use crate::handlers::auth::{mint_session, AuthFlowResponse};
use crate::routes::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendEmailRequest {
    pub user_id: i64,
    pub email: String,
}

/// Handler for GET /api/gateway/v1/auth/currentuser
#[instrument(skip_all, name = "gateway.handlers.current_user")]
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<BearerCredential>,
) -> Result<Json<AuthFlowResponse>, GatewayError> {
    let response = state.auth_api.current_user(&credential).await?;

    Ok(Json(AuthFlowResponse {
        message: response.message.unwrap_or_default(),
        user: response.user,
    }))
}

/// Handler for POST /api/gateway/v1/auth/resend-email
#[instrument(skip_all, name = "gateway.handlers.resend_email")]
pub async fn resend_email(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<BearerCredential>,
    Json(body): Json<ResendEmailRequest>,
) -> Result<Json<AuthFlowResponse>, GatewayError> {
    let response = state
        .auth_api
        .resend_email(body.user_id, &body.email, &credential)
        .await?;

    Ok(Json(AuthFlowResponse {
        message: response.message.unwrap_or_default(),
        user: response.user,
    }))
}

/// Handler for POST /api/gateway/v1/auth/refresh-token/:username
///
/// The auth service issues a fresh bearer token; the browser session is
/// re-minted around it so the cookie rotates along with the credential.
#[instrument(skip_all, name = "gateway.handlers.refresh_token")]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<BearerCredential>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let response = state.auth_api.refresh_token(&username, &credential).await?;
    let session = mint_session(&state, &response, "refresh_token()")?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session)],
        Json(AuthFlowResponse {
            message: response.message.unwrap_or_default(),
            user: response.user,
        }),
    ))
}
