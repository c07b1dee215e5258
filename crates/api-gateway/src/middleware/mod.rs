//! Middleware for the gateway.
//!
//! # Components
//!
//! - `auth` - Session gates and credential propagation

pub mod auth;

pub use auth::{propagate_credential, require_identity, require_session, SessionGateState};
