//! Session gates and credential propagation.
//!
//! Three layers cooperate per request:
//!
//! 1. [`propagate_credential`] (global) - best-effort: any request carrying a
//!    decodable session cookie gets the caller's [`SessionClaims`] and
//!    [`BearerCredential`] attached to its extensions. Never fails.
//! 2. [`require_session`] (protected route groups) - the session presence
//!    gate. Missing cookie and failed verification are rendered identically
//!    as 401 so callers cannot probe the difference.
//! 3. [`require_identity`] (identity-required routes) - fails with 400 when
//!    no identity payload was attached by an earlier stage.
//!
//! Denials are ordinary `Err(GatewayError)` values; the dispatcher renders
//! them and no handler body runs.

use crate::auth::{cookie, BearerCredential, SessionClaims, SessionCodec};
use crate::errors::GatewayError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// State for the session gates.
#[derive(Clone)]
pub struct SessionGateState {
    /// Codec for session artifacts.
    pub codec: Arc<SessionCodec>,
}

/// Attach the caller's credential to any request that carries one.
///
/// Runs globally, before routing-level gates: every session-carrying
/// request gets its credential forwarded regardless of route protection
/// level. The credential lives in this request's extensions only, never on
/// shared client state.
#[instrument(skip_all, name = "gateway.middleware.propagate_credential")]
pub async fn propagate_credential(
    State(state): State<Arc<SessionGateState>>,
    mut req: Request,
    next: Next,
) -> impl IntoResponse {
    if let Some(artifact) = cookie::session_cookie(req.headers()) {
        match state.codec.decode(artifact) {
            Ok(claims) => {
                req.extensions_mut().insert(BearerCredential::from(&claims));
                req.extensions_mut().insert(claims);
            }
            Err(e) => {
                tracing::debug!(
                    target: "gateway.middleware.auth",
                    error = %e,
                    "Session cookie present but not decodable, continuing unauthenticated"
                );
            }
        }
    }

    next.run(req).await
}

/// Session presence gate for protected routes.
///
/// # Response
///
/// - 401 with a fixed message if the cookie is missing or fails verification
/// - Continues with claims and credential in extensions otherwise
#[instrument(skip_all, name = "gateway.middleware.require_session")]
pub async fn require_session(
    State(state): State<Arc<SessionGateState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, GatewayError> {
    let artifact = cookie::session_cookie(req.headers()).ok_or_else(|| {
        tracing::debug!(target: "gateway.middleware.auth", "No session cookie on protected route");
        GatewayError::NotAuthenticated {
            origin: "require_session() missing session",
        }
    })?;

    let claims = state.codec.decode(artifact).map_err(|e| {
        tracing::debug!(target: "gateway.middleware.auth", error = %e, "Session artifact failed verification");
        GatewayError::NotAuthenticated {
            origin: "require_session() invalid session",
        }
    })?;

    req.extensions_mut().insert(BearerCredential::from(&claims));
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Identity-attached gate for routes that must see a resolved caller.
///
/// Fires only when route wiring let a request through without an earlier
/// stage attaching [`SessionClaims`].
#[instrument(skip_all, name = "gateway.middleware.require_identity")]
pub async fn require_identity(
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, GatewayError> {
    if req.extensions().get::<SessionClaims>().is_none() {
        tracing::warn!(target: "gateway.middleware.auth", "Identity payload missing on identity-required route");
        return Err(GatewayError::MalformedAuthState {
            origin: "require_identity() unresolved identity",
        });
    }

    Ok(next.run(req).await)
}
