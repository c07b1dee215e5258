//! Background tasks for the gateway.
//!
//! # Tasks
//!
//! - `search_monitor` - Waits for the search cluster at startup and flips
//!   the readiness flag once it answers healthy

pub mod search_monitor;

pub use search_monitor::{spawn_search_monitor, SearchMonitorConfig};
