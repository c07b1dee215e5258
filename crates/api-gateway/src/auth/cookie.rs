//! Session cookie handling.
//!
//! The session artifact travels in a cookie named `session`. Parsing works
//! directly on the `Cookie` header; building produces the `Set-Cookie`
//! value with the attributes of the public contract (`Max-Age` 7 days,
//! `HttpOnly`, `Path=/`, `SameSite=Lax`, `Secure` outside development).

use crate::auth::session::SESSION_MAX_AGE_SECONDS;
use axum::http::{header, HeaderMap};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Extract the session artifact from the request's `Cookie` header(s).
///
/// Returns the first `session` cookie value found, or `None` when the
/// header is absent, unreadable, or carries no session cookie.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers.get_all(header::COOKIE).iter().find_map(|value| {
        let raw = value.to_str().ok()?;
        raw.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE_NAME).then_some(value)
        })
    })
}

/// Build the `Set-Cookie` value carrying a freshly minted artifact.
pub fn build_session_cookie(artifact: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={artifact}; Max-Age={SESSION_MAX_AGE_SECONDS}; Path=/; HttpOnly; SameSite=Lax"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
