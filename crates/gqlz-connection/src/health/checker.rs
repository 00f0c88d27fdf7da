//! State holder driving the idle/testing/healthy/unhealthy transitions

use parking_lot::RwLock;
use std::time::Instant;

use gqlz_core::{QueryResult, SqlOptions};

use super::ping::{PROBE_SQL, ProbeReport};
use super::status::ConnectionState;
use crate::ConnectionTarget;
use crate::executor::QueryExecutor;

#[derive(Debug, Default)]
struct HealthInner {
    state: ConnectionState,
    last_probe: Option<ProbeReport>,
}

/// Health tracker for the store's active connection.
///
/// Writes are last-write-wins: a probe that completes after a reset still
/// records its outcome.
#[derive(Debug, Default)]
pub struct ConnectionHealth {
    inner: RwLock<HealthInner>,
}

impl ConnectionHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.inner.read().state.clone()
    }

    /// Report of the last completed probe since the last reset
    pub fn last_probe(&self) -> Option<ProbeReport> {
        self.inner.read().last_probe.clone()
    }

    /// Return to `Idle`, discarding any fault and probe report
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        if !inner.state.is_idle() {
            tracing::debug!("connection state reset to idle");
        }
        inner.state = ConnectionState::Idle;
        inner.last_probe = None;
    }

    /// Probe `target` through `executor` and record the outcome.
    ///
    /// Returns `false` without touching the state when there is nothing to test.
    pub async fn test(&self, executor: &QueryExecutor, target: Option<ConnectionTarget>) -> bool {
        let Some(target) = target else {
            tracing::debug!("no configured connection to test");
            return false;
        };

        self.inner.write().state = ConnectionState::Testing;
        let started = Instant::now();
        let result = executor
            .execute_sql(Some(&target), PROBE_SQL, SqlOptions::read_only())
            .await;
        self.complete(started, result)
    }

    fn complete<T>(&self, started: Instant, result: QueryResult<T>) -> bool {
        let latency = started.elapsed();
        let mut inner = self.inner.write();
        match result {
            QueryResult::Success(_) => {
                tracing::info!(latency_ms = latency.as_millis() as u64, "connection healthy");
                inner.state = ConnectionState::Healthy;
                inner.last_probe = Some(ProbeReport::new(true, latency));
                true
            }
            QueryResult::Failure(fault) => {
                tracing::warn!(source = %fault.source, error = %fault.message, "connection unhealthy");
                inner.state = ConnectionState::Unhealthy(fault);
                inner.last_probe = Some(ProbeReport::new(false, latency));
                false
            }
        }
    }
}
