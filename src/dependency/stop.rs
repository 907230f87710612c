//! Close-once stop signal shared between a query and whoever stops it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct StopInner {
    stopped: AtomicBool,
    notify: Notify,
}

/// Broadcast-once cancellation flag.
///
/// Cloning yields another handle to the same signal. Checking is lock-free;
/// closing happens at most once no matter how many handles call [`stop`].
///
/// [`stop`]: StopSignal::stop
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<StopInner>,
}

impl StopSignal {
    /// Create an open signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the signal and wake every waiter.
    ///
    /// Returns `true` for the call that performed the close, `false` for
    /// every later call.
    pub fn stop(&self) -> bool {
        if self.inner.stopped.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.inner.notify.notify_waiters();
        true
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Resolve once the signal has been closed.
    pub async fn stopped(&self) {
        loop {
            // Register before checking the flag so a concurrent close is not missed.
            let notified = self.inner.notify.notified();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}
