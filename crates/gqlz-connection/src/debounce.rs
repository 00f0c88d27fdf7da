//! Debounced connectivity testing for edit forms
//!
//! Each edit is saved at once; the probe runs only after the edits stop for
//! the configured quiet period. The timer belongs to the tester, so dropping
//! the tester drops any probe still waiting. A probe that has already been
//! sent runs to completion in its own task.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{ConnectionManager, StoreSettings};

pub struct DebouncedTester {
    manager: Arc<ConnectionManager>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebouncedTester {
    pub fn new(manager: Arc<ConnectionManager>, delay: Duration) -> Self {
        Self {
            manager,
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Create a tester using the configured quiet period
    pub fn from_settings(manager: Arc<ConnectionManager>, settings: &StoreSettings) -> Self {
        Self::new(manager, settings.test_debounce())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Save an edit, then (re)start the quiet period before probing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn edit(&self, id: Uuid, name: &str, endpoint_url: &str, admin_secret: &str) {
        self.manager
            .update_connection(id, name, endpoint_url, admin_secret);
        self.schedule();
    }

    /// Probe the selected connection once the quiet period elapses, replacing
    /// any probe already waiting.
    pub fn schedule(&self) {
        let manager = self.manager.clone();
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so aborting the timer never interrupts a sent probe
            tokio::spawn(async move {
                let healthy = manager.test_connection().await;
                tracing::debug!(healthy, "debounced connection test finished");
            });
        });

        if let Some(previous) = self.pending.lock().replace(timer) {
            previous.abort();
            tracing::trace!("pending connection test superseded");
        }
    }

    /// Drop the waiting probe, if any. A probe already sent is not affected.
    pub fn cancel(&self) {
        if let Some(timer) = self.pending.lock().take() {
            timer.abort();
            tracing::debug!("pending connection test cancelled");
        }
    }

    /// Whether a probe is waiting out the quiet period
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for DebouncedTester {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.get_mut().take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockTransport;

    const DELAY: Duration = Duration::from_millis(500);

    fn tester() -> (DebouncedTester, Arc<ConnectionManager>, Arc<MockTransport>, Uuid) {
        let transport = MockTransport::new();
        let manager = Arc::new(ConnectionManager::new(transport.clone()));
        let id = manager.add_connection("local", "http://localhost:8080", "pw");
        (DebouncedTester::new(manager.clone(), DELAY), manager, transport, id)
    }

    /// Let spawned tasks run up to their next await point
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_probe_once() {
        let (tester, manager, transport, id) = tester();

        tester.edit(id, "local", "http://localhost:8080", "p");
        tokio::time::sleep(Duration::from_millis(100)).await;
        tester.edit(id, "local", "http://localhost:8080", "pa");
        tokio::time::sleep(Duration::from_millis(100)).await;
        tester.edit(id, "local", "http://localhost:8080", "pass");

        // Each edit is saved immediately
        assert_eq!(manager.selected_connection().unwrap().admin_secret, "pass");
        assert!(tester.is_pending());
        assert_eq!(transport.call_count(), 0);

        tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(transport.call_count(), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(transport.call_count(), 1);
        assert_eq!(transport.last_request().unwrap().admin_secret, "pass");
        assert!(manager.state().is_healthy());
        assert!(!tester.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_probe() {
        let (tester, manager, transport, _) = tester();

        tester.schedule();
        assert!(tester.is_pending());
        tester.cancel();
        assert!(!tester.is_pending());

        tokio::time::sleep(DELAY * 2).await;
        settle().await;
        assert_eq!(transport.call_count(), 0);
        assert!(manager.state().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_probe() {
        let (tester, _, transport, _) = tester();

        tester.schedule();
        drop(tester);

        tokio::time::sleep(DELAY * 2).await;
        settle().await;
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_of_unknown_id_still_probes_selection() {
        let (tester, manager, transport, id) = tester();

        tester.edit(Uuid::new_v4(), "ghost", "http://ghost", "boo");
        tokio::time::sleep(DELAY * 2).await;
        settle().await;

        assert_eq!(transport.call_count(), 1);
        assert_eq!(manager.selected_id(), Some(id));
    }

    mod in_flight {
        use super::*;

        const LATENCY: Duration = Duration::from_secs(1);

        /// Tester whose transport takes `LATENCY` to answer
        fn slow_tester() -> (DebouncedTester, Arc<ConnectionManager>, Arc<MockTransport>, Uuid) {
            let (tester, manager, transport, id) = tester();
            transport.respond_after(LATENCY);
            (tester, manager, transport, id)
        }

        /// Advance past the quiet period so the request is sent but unanswered
        async fn until_sent(manager: &ConnectionManager) {
            tokio::time::sleep(DELAY + Duration::from_millis(100)).await;
            settle().await;
            assert!(manager.state().is_testing());
            assert!(manager.is_loading());
        }

        #[tokio::test(start_paused = true)]
        async fn test_cancel_lets_sent_request_finish() {
            let (tester, manager, transport, _) = slow_tester();

            tester.schedule();
            until_sent(&manager).await;
            tester.cancel();

            tokio::time::sleep(LATENCY * 2).await;
            settle().await;
            assert_eq!(transport.call_count(), 1);
            assert!(manager.state().is_healthy());
            assert!(!manager.is_loading());
        }

        #[tokio::test(start_paused = true)]
        async fn test_drop_lets_sent_request_finish() {
            let (tester, manager, transport, _) = slow_tester();

            tester.schedule();
            until_sent(&manager).await;
            drop(tester);

            tokio::time::sleep(LATENCY * 10).await;
            settle().await;
            assert_eq!(transport.call_count(), 1);
            assert!(manager.state().is_healthy());
            assert!(!manager.is_loading());
            assert!(manager.last_probe().unwrap().healthy);
        }

        #[tokio::test(start_paused = true)]
        async fn test_edit_during_request_schedules_another() {
            let (tester, manager, transport, id) = slow_tester();

            tester.schedule();
            until_sent(&manager).await;

            tester.edit(id, "local", "http://localhost:8080", "rotated");
            assert!(tester.is_pending());

            tokio::time::sleep(DELAY + LATENCY * 2).await;
            settle().await;

            let requests = transport.requests();
            assert_eq!(requests.len(), 2);
            assert_eq!(requests[0].admin_secret, "pw");
            assert_eq!(requests[1].admin_secret, "rotated");
            assert!(manager.state().is_healthy());
            assert!(!manager.is_loading());
            assert!(!tester.is_pending());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_settings_uses_configured_delay() {
        let manager = Arc::new(ConnectionManager::new(MockTransport::new()));
        let settings = StoreSettings {
            test_debounce_ms: 250,
            ..StoreSettings::default()
        };
        let tester = DebouncedTester::from_settings(manager, &settings);
        assert_eq!(tester.delay(), Duration::from_millis(250));
    }
}
