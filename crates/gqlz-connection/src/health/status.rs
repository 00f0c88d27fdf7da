//! Connection state
//!
//! Lifecycle of the currently active connection's health.

use gqlz_core::Fault;
use serde::{Deserialize, Serialize};

/// Health of the active connection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "fault", rename_all = "snake_case")]
pub enum ConnectionState {
    /// Not tested since the last credential or selection change
    #[default]
    Idle,
    /// A probe is in flight
    Testing,
    /// The last probe succeeded
    Healthy,
    /// The last probe failed with this fault
    Unhealthy(Fault),
}

impl ConnectionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ConnectionState::Idle)
    }

    pub fn is_testing(&self) -> bool {
        matches!(self, ConnectionState::Testing)
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, ConnectionState::Healthy)
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, ConnectionState::Unhealthy(_))
    }

    /// The fault of an unhealthy connection
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            ConnectionState::Unhealthy(fault) => Some(fault),
            _ => None,
        }
    }
}
