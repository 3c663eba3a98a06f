//! Phase descriptors and phase results.

use serde::Serialize;

use crate::stats::{CacheStats, CoreStats, DramStats};

/// Immutable description of one phase of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseInfo {
    /// Display name ("Warmup", "Simulation").
    pub name: String,
    /// Whether results of this phase are discarded.
    pub is_warmup: bool,
    /// Instructions each core retires before it completes the phase.
    pub length: u64,
    /// For each core, the index into `trace_names` (and the reader list) it consumes.
    pub trace_index: Vec<usize>,
    /// Names of every available trace.
    pub trace_names: Vec<String>,
    /// Fetched instructions between snapshots; 0 disables snapshotting.
    pub snapshot_rate: u64,
}

/// Cumulative counters captured mid-phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Core counters with `end_instrs`/`end_cycles` set to the live values at capture.
    pub cpu_stats: CoreStats,
    /// Every cache's counters at capture.
    pub cache_stats: Vec<CacheStats>,
}

/// Results of one completed phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhaseStats {
    /// Name of the phase.
    pub name: String,
    /// Trace consumed by each core.
    pub trace_names: Vec<String>,
    /// Per-core counters at phase end.
    pub sim_cpu_stats: Vec<CoreStats>,
    /// Per-core counters frozen when each core finished.
    pub roi_cpu_stats: Vec<CoreStats>,
    /// Per-cache counters at phase end.
    pub sim_cache_stats: Vec<CacheStats>,
    /// Per-cache counters frozen when the core finished.
    pub roi_cache_stats: Vec<CacheStats>,
    /// Per-channel DRAM counters at phase end.
    pub sim_dram_stats: Vec<DramStats>,
    /// Per-channel DRAM counters frozen when the core finished.
    pub roi_dram_stats: Vec<DramStats>,
    /// Interval snapshots in capture order.
    pub snapshots: Vec<Snapshot>,
}
