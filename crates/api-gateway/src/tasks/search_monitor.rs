//! Search cluster readiness monitor.
//!
//! Runs once at process startup. The gateway starts listening immediately;
//! this task only gates the readiness flag, so a briefly absent search
//! cluster never crashes the process. Probe failures are recoverable
//! infrastructure state: the task retries with capped exponential backoff
//! until the cluster answers healthy, then flips the flag and exits.
//!
//! The flag is monotonic: false at boot, true after the first healthy
//! probe, never back.
//!
//! # Graceful Shutdown
//!
//! The retry loop honors a cancellation token and exits cleanly between
//! probes.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// First retry delay after a failed probe.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Backoff cap.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Probe request timeout in seconds.
const PROBE_TIMEOUT_SECS: u64 = 10;

/// Configuration for the search monitor.
#[derive(Debug, Clone)]
pub struct SearchMonitorConfig {
    /// Full URL of the cluster health endpoint.
    pub health_url: String,

    /// First retry delay; doubles after each failure.
    pub initial_backoff: Duration,

    /// Upper bound on the retry delay.
    pub max_backoff: Duration,
}

impl SearchMonitorConfig {
    /// Build the default configuration for a cluster base URL.
    pub fn new(elasticsearch_url: &str) -> Self {
        Self {
            health_url: format!(
                "{}/_cluster/health",
                elasticsearch_url.trim_end_matches('/')
            ),
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
        }
    }
}

#[derive(Debug, Error)]
enum ProbeError {
    #[error("probe request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("health response has no status field")]
    MissingStatus,
}

/// Spawn the search monitor task.
///
/// Returns the task handle and the readiness receiver. The receiver reads
/// `false` until the first successful probe and `true` forever after.
pub fn spawn_search_monitor(
    config: SearchMonitorConfig,
    cancel_token: CancellationToken,
) -> (JoinHandle<()>, watch::Receiver<bool>) {
    let (ready_tx, ready_rx) = watch::channel(false);
    let handle = tokio::spawn(run(config, ready_tx, cancel_token));
    (handle, ready_rx)
}

#[instrument(skip_all, name = "gateway.task.search_monitor")]
async fn run(
    config: SearchMonitorConfig,
    ready: watch::Sender<bool>,
    cancel_token: CancellationToken,
) {
    info!(
        target: "gateway.task.search_monitor",
        health_url = %config.health_url,
        "Waiting for search cluster"
    );

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(
                target: "gateway.task.search_monitor",
                error = %e,
                "Failed to build probe client, readiness stays false"
            );
            return;
        }
    };

    let mut backoff = config.initial_backoff;
    loop {
        match probe(&client, &config.health_url).await {
            Ok(cluster_status) => {
                info!(
                    target: "gateway.task.search_monitor",
                    cluster_status = %cluster_status,
                    "Search cluster is healthy"
                );
                // Terminal: the flag never transitions back to false.
                let _ = ready.send(true);
                return;
            }
            Err(e) => {
                warn!(
                    target: "gateway.task.search_monitor",
                    error = %e,
                    backoff = ?backoff,
                    "Search cluster probe failed, retrying"
                );
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(backoff) => {}
            _ = cancel_token.cancelled() => {
                info!(
                    target: "gateway.task.search_monitor",
                    "Search monitor received shutdown signal, exiting"
                );
                return;
            }
        }

        backoff = backoff.saturating_mul(2).min(config.max_backoff);
    }
}

/// One health probe; success is a non-error response carrying a status field.
async fn probe(client: &reqwest::Client, url: &str) -> Result<String, ProbeError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let body: Value = response.json().await?;
    let status = body
        .get("status")
        .and_then(Value::as_str)
        .ok_or(ProbeError::MissingStatus)?;
    Ok(status.to_owned())
}
