//! Polling Driver
//!
//! Runs one [`Dependency`] as a blocking-query loop: each fetch waits on the
//! last index seen, a snapshot is handed to the caller only when the index
//! moves, and backend failures back off exponentially. The loop ends when the
//! poller or its dependency is stopped.

use crate::client::ClientSet;
use crate::config::PollConfig;
use crate::dependency::{Dependency, QueryOptions, Snapshot, StopSignal};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay before retry `attempt` (1-based): `min * 2^(attempt-1)`, capped at `max`.
pub fn backoff_delay(attempt: u32, min: Duration, max: Duration) -> Duration {
    let factor = 1u32
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u32::MAX);
    min.saturating_mul(factor).min(max)
}

/// Counters reported when a poll loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Snapshots handed to the callback.
    pub emitted: u64,
    /// Failed fetches that were retried.
    pub failures: u64,
    pub last_index: u64,
}

pub struct Poller {
    dependency: Arc<dyn Dependency>,
    clients: Arc<ClientSet>,
    base: QueryOptions,
    config: PollConfig,
    stop: StopSignal,
}

impl Poller {
    pub fn new(
        dependency: Arc<dyn Dependency>,
        clients: Arc<ClientSet>,
        base: QueryOptions,
        config: PollConfig,
    ) -> Self {
        Self {
            dependency,
            clients,
            base,
            config,
            stop: StopSignal::new(),
        }
    }

    /// Stop the loop and its dependency. Safe from any task; idempotent.
    pub fn stop(&self) {
        if self.stop.stop() {
            debug!(dependency = %self.dependency, "Stopping poller");
        }
        self.dependency.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    fn request_options(&self, last_index: u64) -> QueryOptions {
        self.base.merge(
            &QueryOptions::new().with_wait(last_index, self.config.wait_time()),
        )
    }

    /// Resolves when the dependency is stopped directly, never if it has no signal.
    async fn dependency_stopped(&self) {
        match self.dependency.stop_signal() {
            Some(signal) => signal.stopped().await,
            None => std::future::pending().await,
        }
    }

    /// Sleep for `delay`, returning false if the poller or its dependency is
    /// stopped first.
    async fn pause(&self, delay: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = self.stop.stopped() => false,
            _ = self.dependency_stopped() => false,
        }
    }

    /// Poll until stopped, calling `on_change` for every snapshot whose index
    /// differs from the last one emitted.
    pub async fn run<F>(&self, mut on_change: F) -> PollOutcome
    where
        F: FnMut(&Snapshot) + Send,
    {
        let mut outcome = PollOutcome::default();
        // Index the next read blocks on; cleared when the server index resets.
        let mut wait_index: Option<u64> = None;
        let mut last_emitted: Option<u64> = None;
        let mut attempt: u32 = 0;

        info!(dependency = %self.dependency, "Polling started");

        loop {
            let opts = self.request_options(wait_index.unwrap_or(0));

            let result = tokio::select! {
                result = self.dependency.fetch(&self.clients, &opts) => result,
                _ = self.stop.stopped() => break,
            };

            match result {
                Ok(snapshot) => {
                    attempt = 0;
                    let index = snapshot.meta.last_index;

                    if last_emitted != Some(index) {
                        on_change(&snapshot);
                        outcome.emitted += 1;
                        last_emitted = Some(index);
                    }

                    // An index that moves backwards means the server state was
                    // reset; start over with a non-blocking read.
                    wait_index = match wait_index {
                        Some(previous) if index < previous => {
                            debug!(previous, index, "Index went backwards, resetting");
                            None
                        }
                        _ => Some(index),
                    };
                    outcome.last_index = index;

                    // Without an index the server cannot block; pace the loop.
                    if index == 0 && !self.pause(self.config.min_backoff()).await {
                        break;
                    }
                }
                Err(e) if e.is_stopped() => {
                    debug!(dependency = %self.dependency, "Dependency stopped");
                    break;
                }
                Err(e) => {
                    attempt = attempt.saturating_add(1);
                    outcome.failures += 1;
                    let delay =
                        backoff_delay(attempt, self.config.min_backoff(), self.config.max_backoff());
                    warn!(
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Fetch failed, retrying"
                    );
                    if !self.pause(delay).await {
                        break;
                    }
                }
            }
        }

        info!(
            dependency = %self.dependency,
            emitted = outcome.emitted,
            failures = outcome.failures,
            "Polling stopped"
        );
        outcome
    }
}
