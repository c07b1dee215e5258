//! Session artifact codec.
//!
//! Signs and verifies the HS256 JWT stored in the `session` cookie. Signing
//! always uses the primary key; verification accepts the primary or the
//! secondary key, so keys can rotate without forcing every caller to log in
//! again.
//!
//! # Security
//!
//! - Artifacts are size-checked BEFORE parsing (DoS prevention)
//! - Signature and expiry are always verified
//! - Issued-at claims are validated with clock skew tolerance
//! - Failure reasons are logged at debug level and never surfaced

use crate::auth::claims::SessionClaims;
use common::jwt::{check_token_size, validate_iat};
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

/// Session artifact lifetime: 7 days, matching the cookie's `Max-Age`.
pub const SESSION_MAX_AGE_SECONDS: i64 = 7 * 24 * 3600;

/// Errors that can occur in the session codec.
///
/// Decode failures all collapse into one variant so absence, tampering, and
/// expiry are indistinguishable to callers.
#[derive(Debug, Error)]
pub enum SessionCodecError {
    /// The artifact failed size, signature, expiry, or iat checks.
    #[error("The session artifact is invalid or expired")]
    InvalidArtifact,

    /// Claims could not be signed into an artifact.
    #[error("failed to sign session artifact")]
    Signing,
}

/// Codec for session artifacts.
///
/// Built once at startup from the two configured session keys and shared
/// through application state.
pub struct SessionCodec {
    /// Signs new artifacts (primary key only).
    encoding_key: EncodingKey,

    /// Accepted verification keys, tried in order: primary, then secondary.
    decoding_keys: Vec<DecodingKey>,

    /// Clock skew tolerance in seconds for iat validation.
    clock_skew_seconds: i64,
}

impl SessionCodec {
    /// Create a codec from the primary and secondary session keys.
    pub fn new(primary: &SecretString, secondary: &SecretString, clock_skew_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(primary.expose_secret().as_bytes()),
            decoding_keys: vec![
                DecodingKey::from_secret(primary.expose_secret().as_bytes()),
                DecodingKey::from_secret(secondary.expose_secret().as_bytes()),
            ],
            clock_skew_seconds,
        }
    }

    /// Mint a session artifact wrapping a freshly issued bearer credential.
    ///
    /// `iat` is set to now and `exp` to now + [`SESSION_MAX_AGE_SECONDS`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionCodecError::Signing`] if the claims cannot be signed.
    pub fn issue(
        &self,
        id: i64,
        username: &str,
        email: &str,
        bearer: &str,
    ) -> Result<String, SessionCodecError> {
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            id,
            username: username.to_owned(),
            email: email.to_owned(),
            token: bearer.to_owned(),
            iat: now,
            exp: now + SESSION_MAX_AGE_SECONDS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(target: "gateway.auth.session", error = %e, "Failed to sign session artifact");
            SessionCodecError::Signing
        })
    }

    /// Verify an artifact and return its claims.
    ///
    /// Checks, in order: size cap, signature against each accepted key,
    /// expiry, then iat clock skew.
    ///
    /// # Errors
    ///
    /// Returns [`SessionCodecError::InvalidArtifact`] for every failure mode.
    pub fn decode(&self, artifact: &str) -> Result<SessionClaims, SessionCodecError> {
        check_token_size(artifact).map_err(|e| {
            tracing::debug!(target: "gateway.auth.session", error = %e, "Session artifact rejected by size check");
            SessionCodecError::InvalidArtifact
        })?;

        let validation = Validation::new(Algorithm::HS256);

        let mut last_error = None;
        for key in &self.decoding_keys {
            match decode::<SessionClaims>(artifact, key, &validation) {
                Ok(data) => {
                    if let Err(e) = validate_iat(data.claims.iat, self.clock_skew_seconds) {
                        tracing::debug!(target: "gateway.auth.session", error = %e, "Session artifact iat validation failed");
                        return Err(SessionCodecError::InvalidArtifact);
                    }
                    return Ok(data.claims);
                }
                Err(e) => last_error = Some(e),
            }
        }

        tracing::debug!(target: "gateway.auth.session", error = ?last_error, "Session artifact rejected by all keys");
        Err(SessionCodecError::InvalidArtifact)
    }
}
