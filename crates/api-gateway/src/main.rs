//! Gigspace API Gateway
//!
//! Entry point for the marketplace edge gateway. Authenticates callers,
//! propagates credentials to the auth microservice, and gates readiness on
//! the search cluster.

use api_gateway::auth::SessionCodec;
use api_gateway::config::Config;
use api_gateway::routes::{self, AppState};
use api_gateway::services::AuthApiClient;
use api_gateway::tasks::{spawn_search_monitor, SearchMonitorConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting API gateway");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        environment = %config.environment,
        auth_service_url = %config.auth_service_url,
        "Configuration loaded successfully"
    );

    let session_codec = Arc::new(SessionCodec::new(
        &config.session_key_one,
        &config.session_key_two,
        config.session_clock_skew_seconds,
    ));

    let auth_api = AuthApiClient::new(&config.auth_service_url)?;

    // Wait for the search cluster in the background; the listener starts
    // regardless and readiness catches up.
    let cancel_token = CancellationToken::new();
    let (_monitor_handle, search_ready) = spawn_search_monitor(
        SearchMonitorConfig::new(&config.elasticsearch_url),
        cancel_token.clone(),
    );

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    // Create application state
    let state = Arc::new(AppState {
        config,
        auth_api,
        session_codec,
        search_ready,
    });

    // Build application routes
    let app = routes::build_routes(state);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("API gateway listening on {}", addr);

    // Start server with graceful shutdown support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    info!("API gateway shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
///
/// Cancels the background monitor before handing control back to the
/// server's graceful shutdown.
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    cancel_token.cancel();
}
