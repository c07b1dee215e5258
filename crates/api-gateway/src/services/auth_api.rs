//! Auth microservice HTTP client.
//!
//! Typed facade over the internal auth service's REST surface, one method
//! per backend capability. The facade performs no retries: a failed backend
//! call propagates as-is to the error pipeline.
//!
//! # Credential handling
//!
//! The shared `reqwest::Client` never stores a caller credential.
//! Authenticated calls take the caller's [`BearerCredential`] explicitly and
//! set the `Authorization` header on that single request, so concurrent
//! callers cannot observe each other's tokens.

use crate::auth::BearerCredential;
use crate::errors::GatewayError;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, instrument, warn};

/// Request timeout for auth service calls in seconds.
const AUTH_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Connect timeout for auth service calls in seconds.
const AUTH_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Response envelope from the auth service.
///
/// Domain objects are carried as opaque JSON and returned to the caller
/// unchanged; the gateway never interprets them.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthApiResponse {
    /// Human-readable outcome message.
    #[serde(default)]
    pub message: Option<String>,

    /// Domain user object, passed through unchanged.
    #[serde(default)]
    pub user: Option<Value>,

    /// Bearer token issued by the auth service (signin, signup, refresh).
    #[serde(default)]
    pub token: Option<String>,
}

/// HTTP client for the auth microservice.
#[derive(Clone)]
pub struct AuthApiClient {
    /// HTTP client with configured timeouts; holds no caller state.
    client: Client,

    /// Base URL including the `/api/v1/auth` prefix.
    base_url: String,
}

impl AuthApiClient {
    /// Create a new auth service client.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Internal` if the HTTP client cannot be built.
    pub fn new(auth_service_url: &str) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(AUTH_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(AUTH_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                error!(target: "gateway.services.auth_api", error = %e, "Failed to build HTTP client");
                GatewayError::Internal {
                    origin: "AuthApiClient::new()",
                }
            })?;

        Ok(Self {
            client,
            base_url: format!(
                "{}/api/v1/auth",
                auth_service_url.trim_end_matches('/')
            ),
        })
    }

    /// Register a new account. The request body passes through unchanged.
    #[instrument(skip_all, name = "gateway.services.auth_api.signup")]
    pub async fn signup(&self, body: &Value) -> Result<AuthApiResponse, GatewayError> {
        let url = format!("{}/signup", self.base_url);
        let response = self.send(self.client.post(&url).json(body), "signup()").await?;
        Self::parse_envelope(response, "signup()").await
    }

    /// Exchange credentials for a bearer token.
    #[instrument(skip_all, name = "gateway.services.auth_api.signin")]
    pub async fn signin(&self, body: &Value) -> Result<AuthApiResponse, GatewayError> {
        let url = format!("{}/signin", self.base_url);
        let response = self.send(self.client.post(&url).json(body), "signin()").await?;
        Self::parse_envelope(response, "signin()").await
    }

    /// Start a password reset flow for an email address.
    #[instrument(skip_all, name = "gateway.services.auth_api.forgot_password")]
    pub async fn forgot_password(&self, email: &str) -> Result<AuthApiResponse, GatewayError> {
        let url = format!("{}/forgot-password", self.base_url);
        let body = json!({ "email": email });
        let response = self
            .send(self.client.put(&url).json(&body), "forgot_password()")
            .await?;
        Self::parse_envelope(response, "forgot_password()").await
    }

    /// Complete a password reset with the emailed token.
    #[instrument(skip_all, name = "gateway.services.auth_api.reset_password")]
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<AuthApiResponse, GatewayError> {
        let url = format!("{}/reset-password/{}", self.base_url, token);
        let body = json!({ "password": password, "confirmPassword": confirm_password });
        let response = self
            .send(self.client.put(&url).json(&body), "reset_password()")
            .await?;
        Self::parse_envelope(response, "reset_password()").await
    }

    /// Change the authenticated caller's password.
    #[instrument(skip_all, name = "gateway.services.auth_api.change_password")]
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        credential: &BearerCredential,
    ) -> Result<AuthApiResponse, GatewayError> {
        let url = format!("{}/change-password", self.base_url);
        let body = json!({ "currentPassword": current_password, "newPassword": new_password });
        let request = Self::authorize(self.client.post(&url).json(&body), credential);
        let response = self.send(request, "change_password()").await?;
        Self::parse_envelope(response, "change_password()").await
    }

    /// Confirm an email address with the emailed token.
    #[instrument(skip_all, name = "gateway.services.auth_api.verify_email")]
    pub async fn verify_email(
        &self,
        token: &str,
        credential: &BearerCredential,
    ) -> Result<AuthApiResponse, GatewayError> {
        let url = format!("{}/verify-email", self.base_url);
        let body = json!({ "token": token });
        let request = Self::authorize(self.client.put(&url).json(&body), credential);
        let response = self.send(request, "verify_email()").await?;
        Self::parse_envelope(response, "verify_email()").await
    }

    /// Re-send the verification email.
    #[instrument(skip_all, name = "gateway.services.auth_api.resend_email")]
    pub async fn resend_email(
        &self,
        user_id: i64,
        email: &str,
        credential: &BearerCredential,
    ) -> Result<AuthApiResponse, GatewayError> {
        let url = format!("{}/resend-email", self.base_url);
        let body = json!({ "userId": user_id, "email": email });
        let request = Self::authorize(self.client.post(&url).json(&body), credential);
        let response = self.send(request, "resend_email()").await?;
        Self::parse_envelope(response, "resend_email()").await
    }

    /// Fetch the authenticated caller's account.
    #[instrument(skip_all, name = "gateway.services.auth_api.current_user")]
    pub async fn current_user(
        &self,
        credential: &BearerCredential,
    ) -> Result<AuthApiResponse, GatewayError> {
        let url = format!("{}/currentuser", self.base_url);
        let request = Self::authorize(self.client.get(&url), credential);
        let response = self.send(request, "current_user()").await?;
        Self::parse_envelope(response, "current_user()").await
    }

    /// Request a fresh bearer token for the caller.
    #[instrument(skip_all, name = "gateway.services.auth_api.refresh_token", fields(username = %username))]
    pub async fn refresh_token(
        &self,
        username: &str,
        credential: &BearerCredential,
    ) -> Result<AuthApiResponse, GatewayError> {
        let url = format!("{}/refresh-token/{}", self.base_url, username);
        let request = Self::authorize(self.client.get(&url), credential);
        let response = self.send(request, "refresh_token()").await?;
        Self::parse_envelope(response, "refresh_token()").await
    }

    /// Paged gig search; the query string and result pass through unchanged.
    #[instrument(skip_all, name = "gateway.services.auth_api.search_gigs")]
    pub async fn search_gigs(
        &self,
        query: &str,
        from: &str,
        size: &str,
        search_type: &str,
    ) -> Result<Value, GatewayError> {
        let mut url = format!(
            "{}/search/gigs/{}/{}/{}",
            self.base_url, from, size, search_type
        );
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        let response = self.send(self.client.get(&url), "search_gigs()").await?;
        Self::parse_passthrough(response, "search_gigs()").await
    }

    /// Fetch a single gig by id; the result passes through unchanged.
    #[instrument(skip_all, name = "gateway.services.auth_api.get_gig", fields(gig_id = %gig_id))]
    pub async fn get_gig(&self, gig_id: &str) -> Result<Value, GatewayError> {
        let url = format!("{}/search/gigs/{}", self.base_url, gig_id);
        let response = self.send(self.client.get(&url), "get_gig()").await?;
        Self::parse_passthrough(response, "get_gig()").await
    }

    /// Seed the backend with sample gigs.
    #[instrument(skip_all, name = "gateway.services.auth_api.seed")]
    pub async fn seed(&self, count: &str) -> Result<Value, GatewayError> {
        let url = format!("{}/seed/{}", self.base_url, count);
        let response = self.send(self.client.get(&url), "seed()").await?;
        Self::parse_passthrough(response, "seed()").await
    }

    /// Set the caller's credential on one outbound request.
    fn authorize(request: RequestBuilder, credential: &BearerCredential) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", credential.expose()))
    }

    /// Dispatch a request; transport failures surface as upstream 503.
    async fn send(
        &self,
        request: RequestBuilder,
        origin: &'static str,
    ) -> Result<reqwest::Response, GatewayError> {
        request.send().await.map_err(|e| {
            warn!(target: "gateway.services.auth_api", origin, error = %e, "Auth service request failed");
            GatewayError::Upstream {
                status: 503,
                message: "Authentication service is unavailable".to_string(),
            }
        })
    }

    /// Parse a successful envelope or classify the failure.
    async fn parse_envelope(
        response: reqwest::Response,
        origin: &'static str,
    ) -> Result<AuthApiResponse, GatewayError> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(|e| {
                error!(target: "gateway.services.auth_api", origin, error = %e, "Failed to parse auth service response");
                GatewayError::Internal { origin }
            })
        } else {
            Err(Self::classify_failure(status, response, origin).await)
        }
    }

    /// Parse a successful pass-through body or classify the failure.
    async fn parse_passthrough(
        response: reqwest::Response,
        origin: &'static str,
    ) -> Result<Value, GatewayError> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(|e| {
                error!(target: "gateway.services.auth_api", origin, error = %e, "Failed to parse auth service response");
                GatewayError::Internal { origin }
            })
        } else {
            Err(Self::classify_failure(status, response, origin).await)
        }
    }

    /// Map an auth service error status onto the gateway taxonomy.
    ///
    /// 400 means the backend rejected the request body (validation); any
    /// other error passes status and message through verbatim.
    async fn classify_failure(
        status: StatusCode,
        response: reqwest::Response,
        origin: &'static str,
    ) -> GatewayError {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Auth service request failed")
                    .to_string()
            });

        if status == StatusCode::BAD_REQUEST {
            warn!(target: "gateway.services.auth_api", origin, "Auth service rejected request body");
            GatewayError::Validation { message, origin }
        } else {
            warn!(target: "gateway.services.auth_api", origin, status = %status, "Auth service returned an error");
            GatewayError::Upstream {
                status: status.as_u16(),
                message,
            }
        }
    }
}
