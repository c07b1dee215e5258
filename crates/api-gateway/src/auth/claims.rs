//! Session claims and the per-request bearer credential.
//!
//! [`SessionClaims`] is the identity payload decoded from a valid session
//! artifact. It lives in request extensions for the lifetime of one request
//! and is never persisted. The `username`, `email`, and wrapped `token`
//! fields are redacted in Debug output.

use common::secret::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Claims carried by a session artifact.
///
/// Minted at signin/signup; the `token` field wraps the bearer credential
/// issued by the auth service so outbound calls can present it without the
/// browser ever seeing it directly.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User identifier assigned by the auth service.
    pub id: i64,

    /// Username - redacted in Debug output.
    pub username: String,

    /// Email address - redacted in Debug output.
    pub email: String,

    /// Bearer credential issued by the auth service - redacted in Debug output.
    pub token: String,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,
}

/// Custom Debug implementation that redacts PII and the wrapped credential.
impl fmt::Debug for SessionClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClaims")
            .field("id", &self.id)
            .field("username", &"[REDACTED]")
            .field("email", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// The caller's bearer credential for one request.
///
/// Carried in request extensions and passed explicitly to each outbound
/// auth service call. Never stored on shared client state, so concurrent
/// requests cannot observe each other's credentials.
#[derive(Clone)]
pub struct BearerCredential(SecretString);

impl BearerCredential {
    /// Wrap a raw bearer token.
    pub fn new(token: &str) -> Self {
        Self(SecretString::from(token.to_owned()))
    }

    /// Access the raw token for building an `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<&SessionClaims> for BearerCredential {
    fn from(claims: &SessionClaims) -> Self {
        Self::new(&claims.token)
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerCredential([REDACTED])")
    }
}
