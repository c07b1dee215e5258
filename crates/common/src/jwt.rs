//! JWT guards shared across Gigspace services.
//!
//! The actual signing and verification lives with each service (the gateway
//! mints and verifies session artifacts itself); this module carries the
//! checks every token must pass regardless of key material:
//!
//! - Size limit enforced BEFORE any parsing (DoS prevention)
//! - Clock-skew bounded `iat` validation
//!
//! Error messages are intentionally generic; the detailed reason is logged
//! at debug level by the caller.

use std::time::Duration;
use thiserror::Error;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Tokens larger than this are rejected before base64 decoding or signature
/// verification. Typical session artifacts are a few hundred bytes; anything
/// near this limit is hostile or broken.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Default clock skew tolerance for `iat` validation (5 minutes).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Maximum configurable clock skew tolerance (10 minutes).
///
/// Caps misconfiguration; a larger tolerance weakens replay protection.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

/// Errors that can occur during token validation.
///
/// Every variant renders the same generic message so callers cannot be
/// distinguished by failure mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token `iat` claim is too far in the future.
    #[error("The access token is invalid or expired")]
    IatTooFarInFuture,
}

/// Reject oversized tokens before any parsing work is done.
///
/// # Errors
///
/// Returns [`JwtValidationError::TokenTooLarge`] when the token exceeds
/// [`MAX_JWT_SIZE_BYTES`].
pub fn check_token_size(token: &str) -> Result<(), JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        return Err(JwtValidationError::TokenTooLarge);
    }
    Ok(())
}

/// Validate an `iat` claim against the current time with skew tolerance.
///
/// A token "issued" more than `clock_skew_seconds` in the future is either
/// forged or comes from a badly drifted clock; both are rejected.
///
/// # Errors
///
/// Returns [`JwtValidationError::IatTooFarInFuture`] when `iat` exceeds
/// `now + clock_skew_seconds`.
pub fn validate_iat(iat: i64, clock_skew_seconds: i64) -> Result<(), JwtValidationError> {
    let now = chrono::Utc::now().timestamp();
    if iat > now + clock_skew_seconds {
        return Err(JwtValidationError::IatTooFarInFuture);
    }
    Ok(())
}
