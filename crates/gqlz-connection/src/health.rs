//! Connection health for the active gateway connection
//!
//! This module provides the connection state machine and the connectivity
//! probe that drives it.
//!
//! ```text
//! Idle ──test──▶ Testing ──▶ Healthy
//!   ▲                    └──▶ Unhealthy(fault)
//!   └──── credential or selection change
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gqlz_connection::health::ConnectionState;
//!
//! let healthy = manager.test_connection().await;
//! if let ConnectionState::Unhealthy(fault) = manager.state() {
//!     println!("probe failed: {}", fault.message);
//! }
//! ```

mod checker;
mod ping;
mod status;


pub use checker::ConnectionHealth;
pub use ping::{PROBE_SQL, ProbeReport};
pub use status::ConnectionState;
