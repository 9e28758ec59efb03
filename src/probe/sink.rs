// src/probe/sink.rs
// =============================================================================
// This module defines where probe results go.
//
// Key functionality:
// - ReachabilityStatus: the three states a probe can report
// - StatusSink: the trait the presentation layer implements to observe
//   status changes (the UI never reaches into the prober)
// - LatestWins: a wrapper that tags emissions with a sequence number and
//   drops stale results
//
// Why the sequence gating?
// Probes can overlap: a periodic tick can fire while a manual check is
// still in flight. Without gating, whichever probe *finishes* last would
// overwrite the status - even if it was *started* first and its result is
// stale. Tagging each probe with a monotonically increasing sequence and
// accepting only the highest makes it "last requested wins" instead.
//
// Rust concepts:
// - Traits: The sink is an interface; main and the tests provide impls
// - AtomicU64: fetch_max gives us the high-water mark without a lock
// =============================================================================

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

// The reachability classification of the configured server
//
// Transient state - never persisted, recomputed by every probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachabilityStatus {
    /// A probe is in flight; shown before any network activity starts
    Checking,
    /// At least one probing strategy reached the server
    Online,
    /// Both probing strategies failed
    Offline,
}

// Receives status emissions from probes
//
// Implemented by whatever presents the status to the user. A blanket impl
// covers plain closures, so `LatestWins::new(|status| ...)` just works.
pub trait StatusSink: Send + Sync {
    fn emit(&self, status: ReachabilityStatus);
}

impl<F> StatusSink for F
where
    F: Fn(ReachabilityStatus) + Send + Sync,
{
    fn emit(&self, status: ReachabilityStatus) {
        self(status)
    }
}

// A status sink that discards stale probe results
//
// Every emission carries the sequence number of the probe that produced
// it. The sink remembers the highest sequence it has accepted; anything
// lower is a result from a probe that was superseded and gets dropped.
// Emissions with an *equal* sequence pass through, so a probe's Checking
// and its terminal result (which share one sequence) both reach the inner
// sink.
pub struct LatestWins<S> {
    inner: S,
    high_water: AtomicU64,
}

impl<S: StatusSink> LatestWins<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            high_water: AtomicU64::new(0),
        }
    }

    /// The wrapped sink
    pub fn inner(&self) -> &S {
        &self.inner
    }

    // Forwards the status unless a newer probe has already reported
    pub fn emit(&self, seq: u64, status: ReachabilityStatus) {
        // fetch_max returns the previous high-water mark; if ours is
        // lower, a newer probe already reported and this result is stale
        let previous = self.high_water.fetch_max(seq, Ordering::AcqRel);
        if seq < previous {
            return;
        }
        self.inner.emit(status);
    }
}
