//! Runtime Metrics
//!
//! Lock-free counters updated by the dispatch loop. Read them through
//! [`Runtime::stats`](crate::Runtime::stats), which returns a plain snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every handle to one runtime
#[derive(Debug, Default)]
pub struct RuntimeMetrics {
    pub actors_created: AtomicU64,
    pub events_submitted: AtomicU64,
    pub events_emitted: AtomicU64,
    pub commits: AtomicU64,
    pub aborts: AtomicU64,
    pub deferrals: AtomicU64,
    pub empty_dispatches: AtomicU64,
    pub dropped_events: AtomicU64,
}

impl RuntimeMetrics {
    pub fn record_created(&self) {
        self.actors_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_submitted(&self) {
        self.events_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a commit that published `emitted` events
    pub fn record_commit(&self, emitted: usize) {
        self.commits.fetch_add(1, Ordering::Relaxed);
        self.events_emitted.fetch_add(emitted as u64, Ordering::Relaxed);
    }

    pub fn record_abort(&self) {
        self.aborts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deferral(&self) {
        self.deferrals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty(&self) {
        self.empty_dispatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RuntimeStats {
        let commits = self.commits.load(Ordering::Relaxed);
        let aborts = self.aborts.load(Ordering::Relaxed);
        RuntimeStats {
            actors_created: self.actors_created.load(Ordering::Relaxed),
            events_submitted: self.events_submitted.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            handled: commits + aborts,
            commits,
            aborts,
            deferrals: self.deferrals.load(Ordering::Relaxed),
            empty_dispatches: self.empty_dispatches.load(Ordering::Relaxed),
            dropped_events: self.dropped_events.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`RuntimeMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeStats {
    pub actors_created: u64,
    /// Events sent from outside any handling
    pub events_submitted: u64,
    /// Events published by committed effects
    pub events_emitted: u64,
    /// Events whose behavior ran (commits + aborts)
    pub handled: u64,
    pub commits: u64,
    pub aborts: u64,
    pub deferrals: u64,
    pub empty_dispatches: u64,
    pub dropped_events: u64,
}

impl RuntimeStats {
    /// Share of handled events that committed, in percent
    pub fn commit_rate(&self) -> f64 {
        if self.handled == 0 {
            return 100.0;
        }
        self.commits as f64 / self.handled as f64 * 100.0
    }
}
