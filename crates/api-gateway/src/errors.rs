//! Gateway error types.
//!
//! Every failure in the request path funnels into [`GatewayError`], and only
//! its `IntoResponse` impl renders HTTP bodies, so the error contract lives
//! in one place. Bodies are always `{"message": ...}` with the kind's fixed
//! status code. Internal details are logged server-side with an origin tag
//! and never leak to callers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned for a missing or invalid session credential.
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Token is not available. Please login again.";

/// Message returned when an authenticated route runs without a resolved identity.
pub const MALFORMED_AUTH_MESSAGE: &str = "Authentication is required to access this route.";

/// Message returned for unmatched routes.
pub const NOT_FOUND_MESSAGE: &str = "The endpoint called does not exist.";

/// Message returned for unexpected internal failures.
pub const INTERNAL_MESSAGE: &str = "An unexpected error occurred.";

/// Gateway error type.
///
/// Maps to HTTP status codes:
/// - NotAuthenticated: 401 Unauthorized
/// - MalformedAuthState, Validation: 400 Bad Request
/// - NotFound: 404 Not Found
/// - Upstream: the auth service's status, passed through
/// - Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Session cookie missing, or its artifact failed verification.
    /// Both render identically so callers cannot distinguish the two.
    #[error("session credential missing or invalid")]
    NotAuthenticated {
        /// Where the failure was detected, for server-side logs.
        origin: &'static str,
    },

    /// A route requiring a resolved identity ran without one attached.
    #[error("identity not resolved for authenticated route")]
    MalformedAuthState {
        /// Where the failure was detected, for server-side logs.
        origin: &'static str,
    },

    /// No registered route matched the request.
    #[error("no route matched the request path")]
    NotFound,

    /// The auth service rejected the request body.
    #[error("validation rejected by auth service: {message}")]
    Validation {
        /// The auth service's message, surfaced verbatim.
        message: String,
        /// Which facade call produced the rejection.
        origin: &'static str,
    },

    /// The auth service returned an error; status and message pass through.
    #[error("auth service returned {status}: {message}")]
    Upstream {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream message, surfaced verbatim.
        message: String,
    },

    /// Unexpected failure; details are logged, never surfaced.
    #[error("internal gateway error")]
    Internal {
        /// Where the failure was detected, for server-side logs.
        origin: &'static str,
    },
}

impl GatewayError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::NotAuthenticated { .. } => 401,
            GatewayError::MalformedAuthState { .. } | GatewayError::Validation { .. } => 400,
            GatewayError::NotFound => 404,
            GatewayError::Upstream { status, .. } => *status,
            GatewayError::Internal { .. } => 500,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GatewayError::NotAuthenticated { origin } => {
                tracing::debug!(target: "gateway.errors", origin, "Request rejected: not authenticated");
                (
                    StatusCode::UNAUTHORIZED,
                    NOT_AUTHENTICATED_MESSAGE.to_string(),
                )
            }
            GatewayError::MalformedAuthState { origin } => {
                tracing::warn!(target: "gateway.errors", origin, "Authenticated route reached without identity");
                (StatusCode::BAD_REQUEST, MALFORMED_AUTH_MESSAGE.to_string())
            }
            GatewayError::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string()),
            GatewayError::Validation { message, origin } => {
                tracing::debug!(target: "gateway.errors", origin, "Auth service rejected request body");
                (StatusCode::BAD_REQUEST, message.clone())
            }
            GatewayError::Upstream { status, message } => {
                tracing::warn!(target: "gateway.errors", status, "Auth service error passed through");
                // Invalid upstream codes degrade to 502 rather than dropping
                // the response.
                (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                    message.clone(),
                )
            }
            GatewayError::Internal { origin } => {
                tracing::error!(target: "gateway.errors", origin, "Unexpected gateway error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    // Helper to read a response body as JSON
    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_display_not_authenticated() {
        let error = GatewayError::NotAuthenticated { origin: "test" };
        assert_eq!(
            format!("{}", error),
            "session credential missing or invalid"
        );
    }

    #[test]
    fn test_display_upstream() {
        let error = GatewayError::Upstream {
            status: 503,
            message: "down for maintenance".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "auth service returned 503: down for maintenance"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GatewayError::NotAuthenticated { origin: "t" }.status_code(),
            401
        );
        assert_eq!(
            GatewayError::MalformedAuthState { origin: "t" }.status_code(),
            400
        );
        assert_eq!(GatewayError::NotFound.status_code(), 404);
        assert_eq!(
            GatewayError::Validation {
                message: "bad email".to_string(),
                origin: "t"
            }
            .status_code(),
            400
        );
        assert_eq!(
            GatewayError::Upstream {
                status: 409,
                message: "conflict".to_string()
            }
            .status_code(),
            409
        );
        assert_eq!(GatewayError::Internal { origin: "t" }.status_code(), 500);
    }

    #[tokio::test]
    async fn test_into_response_not_authenticated() {
        let response = GatewayError::NotAuthenticated { origin: "t" }.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(
            body["message"],
            "Token is not available. Please login again."
        );
    }

    #[tokio::test]
    async fn test_into_response_malformed_auth_state() {
        let response = GatewayError::MalformedAuthState { origin: "t" }.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(
            body["message"],
            "Authentication is required to access this route."
        );
    }

    #[tokio::test]
    async fn test_into_response_not_found() {
        let response = GatewayError::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["message"], "The endpoint called does not exist.");
    }

    #[tokio::test]
    async fn test_into_response_validation_surfaces_backend_message() {
        let response = GatewayError::Validation {
            message: "Email is invalid".to_string(),
            origin: "t",
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["message"], "Email is invalid");
    }

    #[tokio::test]
    async fn test_into_response_upstream_passes_status_and_message() {
        let response = GatewayError::Upstream {
            status: 503,
            message: "Authentication service is unavailable".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["message"], "Authentication service is unavailable");
    }

    #[tokio::test]
    async fn test_into_response_upstream_invalid_status_degrades_to_502() {
        let response = GatewayError::Upstream {
            status: 42,
            message: "nonsense".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_into_response_internal_is_generic() {
        let response = GatewayError::Internal {
            origin: "somewhere deep",
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["message"], "An unexpected error occurred.");
        assert!(
            !body["message"]
                .as_str()
                .unwrap()
                .contains("somewhere deep"),
            "Origin tag must not leak to callers"
        );
    }
}
