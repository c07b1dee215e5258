//! Service layer for the gateway.
//!
//! # Components
//!
//! - `auth_api` - HTTP client for the auth microservice

pub mod auth_api;

pub use auth_api::{AuthApiClient, AuthApiResponse};
