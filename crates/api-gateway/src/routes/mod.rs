//! HTTP routes for the gateway.
//!
//! Defines the Axum router, the shared application state, and the not-found
//! stage of the error pipeline.

use crate::auth::SessionCodec;
use crate::config::Config;
use crate::errors::GatewayError;
use crate::handlers;
use crate::middleware::{
    propagate_credential, require_identity, require_session, SessionGateState,
};
use crate::services::AuthApiClient;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method, Uri};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer, trace::TraceLayer,
};

/// Maximum accepted request body size (200 MB, the client contract).
const MAX_BODY_BYTES: usize = 200 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Typed client for the auth microservice.
    pub auth_api: AuthApiClient,

    /// Codec for session artifacts.
    pub session_codec: Arc<SessionCodec>,

    /// Search dependency readiness; false until the first healthy probe.
    pub search_ready: watch::Receiver<bool>,
}

/// Build the application routes.
///
/// Three route groups under `/api/gateway/v1`:
/// - public: signup, signin, password recovery, search pass-throughs
/// - session-protected: change-password, verify-email
/// - identity-required: currentuser, resend-email, refresh-token
///
/// Plus `/gateway-health` (liveness) and a fallback that renders the 404
/// stage of the error pipeline.
pub fn build_routes(state: Arc<AppState>) -> Router {
    let gate_state = Arc::new(SessionGateState {
        codec: state.session_codec.clone(),
    });

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/gateway-health", get(handlers::gateway_health))
        .route("/api/gateway/v1/auth/signup", post(handlers::signup))
        .route("/api/gateway/v1/auth/signin", post(handlers::signin))
        .route(
            "/api/gateway/v1/auth/forgot-password",
            put(handlers::forgot_password),
        )
        .route(
            "/api/gateway/v1/auth/reset-password/:token",
            put(handlers::reset_password),
        )
        .route(
            "/api/gateway/v1/auth/search/gigs/:from/:size/:type",
            get(handlers::search_gigs),
        )
        .route(
            "/api/gateway/v1/auth/search/gig/:gig_id",
            get(handlers::get_gig),
        )
        .route("/api/gateway/v1/auth/seed/:count", get(handlers::seed))
        .with_state(state.clone());

    // Session-protected routes (presence gate only)
    let session_routes = Router::new()
        .route(
            "/api/gateway/v1/auth/change-password",
            put(handlers::change_password),
        )
        .route(
            "/api/gateway/v1/auth/verify-email",
            put(handlers::verify_email),
        )
        .route_layer(middleware::from_fn_with_state(
            gate_state.clone(),
            require_session,
        ))
        .with_state(state.clone());

    // Identity-required routes (both gates; require_session runs first)
    let identity_routes = Router::new()
        .route(
            "/api/gateway/v1/auth/currentuser",
            get(handlers::current_user),
        )
        .route(
            "/api/gateway/v1/auth/resend-email",
            post(handlers::resend_email),
        )
        .route(
            "/api/gateway/v1/auth/refresh-token/:username",
            post(handlers::refresh_token),
        )
        .route_layer(middleware::from_fn(require_identity))
        .route_layer(middleware::from_fn_with_state(
            gate_state.clone(),
            require_session,
        ))
        .with_state(state.clone());

    let cors_origin = state
        .config
        .client_url
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static(crate::config::DEFAULT_CLIENT_URL));

    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    // Merge routes and apply global middleware layers
    // Layer order (bottom-to-top execution):
    // 1. propagate_credential - attach caller credential (innermost)
    // 2. TimeoutLayer - timeout the request
    // 3. TraceLayer - log request details
    // 4. CorsLayer / CompressionLayer / RequestBodyLimitLayer (outermost)
    public_routes
        .merge(session_routes)
        .merge(identity_routes)
        .fallback(unmatched_route)
        .layer(middleware::from_fn_with_state(
            gate_state,
            propagate_credential,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

/// Not-found stage of the error pipeline.
///
/// Logs the unmatched path and renders the fixed 404 body.
async fn unmatched_route(method: Method, uri: Uri) -> GatewayError {
    tracing::warn!(
        target: "gateway.routes",
        %method,
        path = %uri,
        "Endpoint does not exist"
    );

    GatewayError::NotFound
}
