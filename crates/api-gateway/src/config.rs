//! Gateway configuration.
//!
//! Configuration is loaded from environment variables. Session signing keys
//! are held as [`SecretString`] and redacted in Debug output.

use axum::http::HeaderValue;
use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:4000";

/// Default deployment environment.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Default browser client origin for CORS.
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:3000";

/// Gateway configuration.
///
/// Loaded from environment variables; `from_vars` exists so tests can build
/// a configuration without touching the process environment.
#[derive(Clone)]
pub struct Config {
    /// Primary session signing key (signs new artifacts).
    pub session_key_one: SecretString,

    /// Secondary session signing key (accepted during rotation).
    pub session_key_two: SecretString,

    /// Base URL of the internal auth microservice.
    pub auth_service_url: String,

    /// Base URL of the search/index cluster probed at startup.
    pub elasticsearch_url: String,

    /// Server bind address (default: "0.0.0.0:4000").
    pub bind_address: String,

    /// Deployment environment; anything but "development" turns on the
    /// `Secure` cookie flag.
    pub environment: String,

    /// Browser client origin allowed by CORS.
    pub client_url: String,

    /// Clock skew tolerance in seconds for session artifact validation.
    pub session_clock_skew_seconds: i64,
}

/// Custom Debug implementation that redacts the session keys.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("session_key_one", &"[REDACTED]")
            .field("session_key_two", &"[REDACTED]")
            .field("auth_service_url", &self.auth_service_url)
            .field("elasticsearch_url", &self.elasticsearch_url)
            .field("bind_address", &self.bind_address)
            .field("environment", &self.environment)
            .field("client_url", &self.client_url)
            .field(
                "session_clock_skew_seconds",
                &self.session_clock_skew_seconds,
            )
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid session clock skew configuration: {0}")]
    InvalidClockSkew(String),

    #[error("Invalid client URL configuration: {0}")]
    InvalidClientUrl(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let session_key_one = vars
            .get("SESSION_KEY_ONE")
            .ok_or_else(|| ConfigError::MissingEnvVar("SESSION_KEY_ONE".to_string()))
            .map(|key| SecretString::from(key.clone()))?;

        let session_key_two = vars
            .get("SESSION_KEY_TWO")
            .ok_or_else(|| ConfigError::MissingEnvVar("SESSION_KEY_TWO".to_string()))
            .map(|key| SecretString::from(key.clone()))?;

        let auth_service_url = vars
            .get("AUTH_SERVICE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_SERVICE_URL".to_string()))?
            .clone();

        let elasticsearch_url = vars
            .get("ELASTICSEARCH_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("ELASTICSEARCH_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("GATEWAY_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let environment = vars
            .get("GATEWAY_ENV")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let client_url = vars
            .get("CLIENT_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CLIENT_URL.to_string());

        // CORS needs the origin as a header value; reject unusable ones at
        // startup instead of during request handling.
        if client_url.parse::<HeaderValue>().is_err() {
            return Err(ConfigError::InvalidClientUrl(format!(
                "CLIENT_URL is not a valid origin value: '{}'",
                client_url
            )));
        }

        // Parse session clock skew tolerance with validation
        let session_clock_skew_seconds =
            if let Some(value_str) = vars.get("SESSION_CLOCK_SKEW_SECONDS") {
                let value: i64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidClockSkew(format!(
                        "SESSION_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value <= 0 {
                    return Err(ConfigError::InvalidClockSkew(format!(
                        "SESSION_CLOCK_SKEW_SECONDS must be positive, got {}",
                        value
                    )));
                }

                if value > MAX_CLOCK_SKEW.as_secs() as i64 {
                    return Err(ConfigError::InvalidClockSkew(format!(
                        "SESSION_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {}",
                        MAX_CLOCK_SKEW.as_secs(),
                        value
                    )));
                }

                value
            } else {
                DEFAULT_CLOCK_SKEW.as_secs() as i64
            };

        Ok(Config {
            session_key_one,
            session_key_two,
            auth_service_url,
            elasticsearch_url,
            bind_address,
            environment,
            client_url,
            session_clock_skew_seconds,
        })
    }

    /// Whether session cookies carry the `Secure` flag.
    pub fn secure_cookies(&self) -> bool {
        self.environment != "development"
    }
}
