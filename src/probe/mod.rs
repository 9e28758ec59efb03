// src/probe/mod.rs
// =============================================================================
// This module contains the reachability probing logic.
//
// Submodules:
// - http: The prober itself - two probing strategies over HTTP
// - sink: Where status emissions go, with stale-result gating
//
// This file (mod.rs) is the module root - it re-exports the public API so
// callers write `probe::Prober` instead of `probe::http::Prober`.
// =============================================================================

mod http;
mod sink;

pub use http::Prober;
pub use sink::{LatestWins, ReachabilityStatus, StatusSink};
