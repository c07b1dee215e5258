//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use them for all
//! sensitive values: session signing keys, bearer credentials, passwords.
//!
//! `SecretString` implements `Debug` with redaction, so any struct that
//! derives `Debug` while holding one cannot leak the value through `{:?}` or
//! tracing fields. Secrets are zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct SigningKeys {
//!     primary: SecretString,
//! }
//!
//! let keys = SigningKeys {
//!     primary: SecretString::from("k1-placeholder"),
//! };
//!
//! // Redacted: SigningKeys { primary: SecretBox<str>([REDACTED]) }
//! println!("{:?}", keys);
//!
//! // Access requires an explicit expose_secret() call
//! let raw: &str = keys.primary.expose_secret();
//! # assert_eq!(raw, "k1-placeholder");
//! ```

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};
