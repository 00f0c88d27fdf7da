//! Connectivity probe
//!
//! A connection is probed by running a minimal read-only SQL statement
//! through the regular SQL path, so the probe exercises the endpoint, the
//! secret and the database behind the gateway in one round trip.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Statement sent to validate connectivity and credentials
pub const PROBE_SQL: &str = "SELECT 1";

/// Outcome of the most recent completed probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Whether the probe succeeded
    pub healthy: bool,
    /// Round-trip time of the probe request
    pub latency: Duration,
    /// When the probe completed
    pub checked_at: DateTime<Utc>,
}

impl ProbeReport {
    pub fn new(healthy: bool, latency: Duration) -> Self {
        Self {
            healthy,
            latency,
            checked_at: Utc::now(),
        }
    }
}
