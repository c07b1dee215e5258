//! Signup and signin controllers.
//!
//! Both forward the request body to the auth service unchanged and, on
//! success, mint a fresh session artifact wrapping the backend-issued
//! bearer token. The browser only ever holds the artifact, so backend
//! token format and session lifetime stay decoupled.

use crate::auth::cookie;
use crate::errors::GatewayError;
use crate::routes::AppState;
use crate::services::AuthApiResponse;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Success envelope for auth flows: `{message}` or `{message, user}`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthFlowResponse {
    /// Outcome message from the auth service.
    pub message: String,

    /// Domain user object, passed through unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

/// Identity fields the auth service returns alongside a fresh token.
#[derive(Debug, Deserialize)]
struct IssuedIdentity {
    id: i64,
    username: String,
    email: String,
}

/// Handler for POST /api/gateway/v1/auth/signup
#[instrument(skip_all, name = "gateway.handlers.auth.signup")]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    let response = state.auth_api.signup(&body).await?;
    let session = mint_session(&state, &response, "signup()")?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session)],
        Json(AuthFlowResponse {
            message: response.message.unwrap_or_default(),
            user: response.user,
        }),
    ))
}

/// Handler for POST /api/gateway/v1/auth/signin
#[instrument(skip_all, name = "gateway.handlers.auth.signin")]
pub async fn signin(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    let response = state.auth_api.signin(&body).await?;
    let session = mint_session(&state, &response, "signin()")?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session)],
        Json(AuthFlowResponse {
            message: response.message.unwrap_or_default(),
            user: response.user,
        }),
    ))
}

/// Mint the `Set-Cookie` value for a token-bearing auth service response.
///
/// The response must carry both the issued token and the user's identity
/// fields; anything else is a broken backend contract and surfaces as an
/// internal error.
pub(crate) fn mint_session(
    state: &AppState,
    response: &AuthApiResponse,
    origin: &'static str,
) -> Result<String, GatewayError> {
    let token = response.token.as_deref().ok_or_else(|| {
        tracing::error!(target: "gateway.handlers.auth", origin, "Auth service response is missing a token");
        GatewayError::Internal { origin }
    })?;

    let user = response.user.clone().ok_or_else(|| {
        tracing::error!(target: "gateway.handlers.auth", origin, "Auth service response is missing the user");
        GatewayError::Internal { origin }
    })?;

    let identity: IssuedIdentity = serde_json::from_value(user).map_err(|e| {
        tracing::error!(target: "gateway.handlers.auth", origin, error = %e, "Auth service user payload is missing identity fields");
        GatewayError::Internal { origin }
    })?;

    let artifact = state
        .session_codec
        .issue(identity.id, &identity.username, &identity.email, token)
        .map_err(|e| {
            tracing::error!(target: "gateway.handlers.auth", origin, error = %e, "Failed to mint session artifact");
            GatewayError::Internal { origin }
        })?;

    Ok(cookie::build_session_cookie(
        &artifact,
        state.config.secure_cookies(),
    ))
}
