//! Session authentication for the gateway.
//!
//! # Components
//!
//! - `claims` - Identity payload and the per-request bearer credential
//! - `session` - Session artifact codec (sign, verify, dual-secret rotation)
//! - `cookie` - `session` cookie parsing and building

pub mod claims;
pub mod cookie;
pub mod session;

pub use claims::{BearerCredential, SessionClaims};
pub use session::{SessionCodec, SessionCodecError};
