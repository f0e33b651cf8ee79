// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reload watcher: poll the nonce source on a timer and fire the
//! reloader when the token changes.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::nonce::{Nonce, NonceChange, NonceTracker, Observation};
use crate::reloader::{AfterReload, Reloader};
use crate::source::NonceSource;

/// Default poll period.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Default cap on concurrently outstanding fetches.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// What a single reading did to the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No reading this tick; state untouched.
    Skipped(FetchError),
    /// A reading that was overtaken by a newer one; discarded.
    Stale,
    /// First reading after the sentinel.
    Baseline(Nonce),
    Unchanged,
    /// The token changed and the reloader ran.
    Reloaded { change: NonceChange, after: AfterReload },
}

/// Why [`ReloadWatcher::run`] returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    #[default]
    Cancelled,
    /// The reloader asked the watcher to stop.
    Reloaded,
}

/// Counters reported when the run loop exits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub readings: u64,
    pub skipped: u64,
    pub stale: u64,
    /// Ticks that issued no fetch because the in-flight cap was reached.
    pub throttled: u64,
    pub reloads: u64,
    pub stop: StopReason,
}

impl WatchSummary {
    fn record(&mut self, outcome: &TickOutcome) {
        match outcome {
            TickOutcome::Skipped(_) => self.skipped += 1,
            TickOutcome::Stale => self.stale += 1,
            TickOutcome::Baseline(_) | TickOutcome::Unchanged => self.readings += 1,
            TickOutcome::Reloaded { .. } => {
                self.readings += 1;
                self.reloads += 1;
            }
        }
    }
}

/// Polls a [`NonceSource`] and fires a [`Reloader`] on change.
///
/// Owns its own [`NonceTracker`], so any number of watchers can run side by
/// side.
pub struct ReloadWatcher {
    source: Arc<dyn NonceSource>,
    reloader: Box<dyn Reloader>,
    tracker: NonceTracker,
    interval: Duration,
    max_in_flight: usize,
    /// Sequence number of the most recently issued fetch.
    issued: u64,
    /// Sequence number of the newest fetch applied to the tracker.
    applied: u64,
}

impl ReloadWatcher {
    pub fn new(source: Arc<dyn NonceSource>, reloader: Box<dyn Reloader>) -> Self {
        Self {
            source,
            reloader,
            tracker: NonceTracker::new(),
            interval: DEFAULT_INTERVAL,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            issued: 0,
            applied: 0,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Cap outstanding fetches; ticks beyond the cap are skipped. Clamped
    /// to at least one.
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max.max(1);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn tracker(&self) -> &NonceTracker {
        &self.tracker
    }

    /// Fetch once and apply the result.
    pub async fn tick(&mut self) -> TickOutcome {
        let seq = self.next_seq();
        let result = self.source.fetch().await;
        self.apply_seq(seq, result)
    }

    /// Apply one reading, as if it came from the newest fetch.
    pub fn apply(&mut self, result: Result<Nonce, FetchError>) -> TickOutcome {
        let seq = self.next_seq();
        self.apply_seq(seq, result)
    }

    fn next_seq(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn apply_seq(&mut self, seq: u64, result: Result<Nonce, FetchError>) -> TickOutcome {
        let nonce = match result {
            Ok(nonce) => nonce,
            Err(e) => {
                tracing::debug!(err = %e, "nonce poll failed");
                return TickOutcome::Skipped(e);
            }
        };

        // Readings from overlapping requests land in completion order; only
        // the newest issued one may move the tracker.
        if seq <= self.applied {
            tracing::debug!(seq, applied = self.applied, "discarding stale nonce reading");
            return TickOutcome::Stale;
        }
        self.applied = seq;

        match self.tracker.observe(nonce.clone()) {
            Observation::Baseline => {
                tracing::info!(nonce = %nonce, "nonce baseline established");
                TickOutcome::Baseline(nonce)
            }
            Observation::Unchanged => TickOutcome::Unchanged,
            Observation::Changed(change) => {
                let after = self.reloader.reload(&change);
                TickOutcome::Reloaded { change, after }
            }
        }
    }

    /// Poll until `shutdown` fires or the reloader returns
    /// [`AfterReload::Stop`].
    ///
    /// The first fetch goes out one interval after start. Each tick's fetch
    /// runs as its own task, so a hung request never delays the next tick.
    /// Once `max_in_flight` fetches are outstanding, further ticks are
    /// skipped until one completes.
    pub async fn run(mut self, shutdown: CancellationToken) -> WatchSummary {
        let start = tokio::time::Instant::now() + self.interval;
        let mut timer = tokio::time::interval_at(start, self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut in_flight: JoinSet<(u64, Result<Nonce, FetchError>)> = JoinSet::new();
        let mut summary = WatchSummary::default();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    summary.stop = StopReason::Cancelled;
                    break;
                }
                _ = timer.tick() => {
                    if in_flight.len() >= self.max_in_flight {
                        tracing::debug!(
                            in_flight = in_flight.len(),
                            "nonce fetches backed up, skipping tick"
                        );
                        summary.throttled += 1;
                        continue;
                    }
                    let seq = self.next_seq();
                    let source = Arc::clone(&self.source);
                    in_flight.spawn(async move { (seq, source.fetch().await) });
                }
                Some(joined) = in_flight.join_next() => {
                    let (seq, result) = match joined {
                        Ok(v) => v,
                        Err(e) => {
                            tracing::debug!(err = %e, "nonce fetch task failed");
                            continue;
                        }
                    };
                    let outcome = self.apply_seq(seq, result);
                    summary.record(&outcome);
                    if let TickOutcome::Reloaded { after: AfterReload::Stop, .. } = outcome {
                        summary.stop = StopReason::Reloaded;
                        break;
                    }
                }
            }
        }

        in_flight.abort_all();
        summary
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
