use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// The run's single cancellation primitive. Workers poll it at loop
/// boundaries; pacing sleeps wait on it.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    inner: Arc<StopState>,
}

#[derive(Debug, Default)]
struct StopState {
    stopped: AtomicBool,
    notify: Notify,
}

impl StopFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent.
    pub fn stop(&self) {
        if !self.inner.stopped.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Resolves once [`Self::stop`] has been called.
    pub async fn stopped(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::run_async_test;
    use std::time::Duration;

    #[test]
    fn stop_wakes_waiters() -> Result<(), String> {
        run_async_test(async {
            let flag = StopFlag::new();
            let waiter = {
                let flag = flag.clone();
                tokio::spawn(async move { flag.stopped().await })
            };
            tokio::task::yield_now().await;
            flag.stop();
            flag.stop();
            tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .map_err(|err| format!("Waiter not woken: {}", err))?
                .map_err(|err| format!("Waiter join error: {}", err))?;
            if !flag.is_stopped() {
                return Err("Flag not set".to_owned());
            }
            Ok(())
        })
    }

    #[test]
    fn stopped_returns_immediately_when_already_set() -> Result<(), String> {
        run_async_test(async {
            let flag = StopFlag::new();
            flag.stop();
            tokio::time::timeout(Duration::from_millis(100), flag.stopped())
                .await
                .map_err(|err| format!("stopped() blocked: {}", err))
        })
    }
}
