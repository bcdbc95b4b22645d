//! One-shot readiness signal

use std::sync::Arc;

use tokio::sync::watch;

/// Completion marker for "every appliance has initialized"
///
/// Resolves at most once. Clones share the same signal, any number of
/// tasks may wait on it, and concurrent `resolve` calls elect exactly one
/// winner.
#[derive(Debug, Clone)]
pub struct ReadinessSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ReadinessSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Resolve the signal
    ///
    /// Returns true only for the call that performed the transition.
    pub fn resolve(&self) -> bool {
        self.tx.send_if_modified(|resolved| {
            if *resolved {
                false
            } else {
                *resolved = true;
                true
            }
        })
    }

    pub fn is_resolved(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the signal resolves; returns immediately if it already has
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|resolved| *resolved).await;
    }
}

impl Default for ReadinessSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_resolves_once() {
        let signal = ReadinessSignal::new();
        assert!(!signal.is_resolved());
        assert!(signal.resolve());
        assert!(!signal.resolve());
        assert!(signal.is_resolved());
    }

    #[tokio::test]
    async fn test_waiters_wake_on_resolve() {
        let signal = ReadinessSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        signal.resolve();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_wait_is_pending_until_resolved() {
        let signal = ReadinessSignal::new();
        let mut wait = tokio_test::task::spawn(signal.wait());
        tokio_test::assert_pending!(wait.poll());

        signal.resolve();
        assert!(wait.is_woken());
        tokio_test::assert_ready!(wait.poll());
    }

    #[tokio::test]
    async fn test_wait_after_resolve_returns_immediately() {
        let signal = ReadinessSignal::new();
        signal.resolve();
        tokio::time::timeout(Duration::from_millis(10), signal.wait())
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolve_has_one_winner() {
        let signal = ReadinessSignal::new();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let signal = signal.clone();
                tokio::spawn(async move { signal.resolve() })
            })
            .collect();

        let winners = futures::future::join_all(handles)
            .await
            .into_iter()
            .filter(|r| *r.as_ref().unwrap())
            .count();
        assert_eq!(winners, 1);
    }
}
