//! Password flow controllers.
//!
//! Forgot and reset run unauthenticated; change-password requires the
//! caller's session and forwards their bearer credential. Password fields
//! are held as [`SecretString`] so request structs stay safe to Debug.

use crate::auth::BearerCredential;
use crate::errors::GatewayError;
use crate::handlers::auth::AuthFlowResponse;
use crate::routes::AppState;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use common::secret::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: SecretString,
    pub confirm_password: SecretString,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: SecretString,
    pub new_password: SecretString,
}

/// Handler for PUT /api/gateway/v1/auth/forgot-password
#[instrument(skip_all, name = "gateway.handlers.password.forgot")]
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<AuthFlowResponse>, GatewayError> {
    let response = state.auth_api.forgot_password(&body.email).await?;

    Ok(Json(AuthFlowResponse {
        message: response.message.unwrap_or_default(),
        user: None,
    }))
}

/// Handler for PUT /api/gateway/v1/auth/reset-password/:token
#[instrument(skip_all, name = "gateway.handlers.password.reset")]
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<AuthFlowResponse>, GatewayError> {
    let response = state
        .auth_api
        .reset_password(
            &token,
            body.password.expose_secret(),
            body.confirm_password.expose_secret(),
        )
        .await?;

    Ok(Json(AuthFlowResponse {
        message: response.message.unwrap_or_default(),
        user: None,
    }))
}

/// Handler for PUT /api/gateway/v1/auth/change-password
#[instrument(skip_all, name = "gateway.handlers.password.change")]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<BearerCredential>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<AuthFlowResponse>, GatewayError> {
    let response = state
        .auth_api
        .change_password(
            body.current_password.expose_secret(),
            body.new_password.expose_secret(),
            &credential,
        )
        .await?;

    Ok(Json(AuthFlowResponse {
        message: response.message.unwrap_or_default(),
        user: None,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_request_uses_camel_case() {
        let json = r#"{"password":"new-pass","confirmPassword":"new-pass"}"#;
        let request: ResetPasswordRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.password.expose_secret(), "new-pass");
        assert_eq!(request.confirm_password.expose_secret(), "new-pass");
    }

    #[test]
    fn test_change_request_uses_camel_case() {
        let json = r#"{"currentPassword":"old","newPassword":"new"}"#;
        let request: ChangePasswordRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.current_password.expose_secret(), "old");
        assert_eq!(request.new_password.expose_secret(), "new");
    }

    #[test]
    fn test_request_debug_redacts_passwords() {
        let json = r#"{"currentPassword":"old-secret","newPassword":"new-secret"}"#;
        let request: ChangePasswordRequest = serde_json::from_str(json).unwrap();

        let debug_output = format!("{:?}", request);

        assert!(!debug_output.contains("old-secret"));
        assert!(!debug_output.contains("new-secret"));
    }
}
