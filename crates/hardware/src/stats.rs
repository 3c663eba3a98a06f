//! Simulation statistics collection.
//!
//! This module defines the counters each component accumulates during a phase. It provides:
//! 1. **Core:** Instruction and cycle window of the phase, IPC, and branch behavior by type.
//! 2. **Cache:** Hits and misses per access type, prefetch accounting, and miss latency.
//! 3. **DRAM:** Reads, writes, and row buffer locality.
//!
//! Every counter is cumulative from the start of the phase. Consumers derive interval
//! values by subtracting consecutive snapshots.

use serde::Serialize;

use crate::common::data::AccessType;
use crate::trace::BranchKind;

/// Per-core statistics for one phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoreStats {
    /// Core name (e.g. `cpu0`).
    pub name: String,
    /// Retired instruction count when the phase began.
    pub begin_instrs: u64,
    /// Core cycle when the phase began.
    pub begin_cycles: u64,
    /// Retired instruction count at the last update.
    pub end_instrs: u64,
    /// Core cycle at the last update.
    pub end_cycles: u64,
    /// Retired branches, indexed by [`BranchKind::index`].
    pub branch_type_counts: [u64; BranchKind::COUNT],
    /// Mispredicted branches, indexed by [`BranchKind::index`].
    pub branch_type_misses: [u64; BranchKind::COUNT],
    /// Sum of ROB occupancy observed at each misprediction.
    pub total_rob_occupancy_at_mispredict: u64,
}

impl CoreStats {
    /// Creates zeroed statistics for the named core.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Instructions retired within the phase.
    pub const fn instrs(&self) -> u64 {
        self.end_instrs.saturating_sub(self.begin_instrs)
    }

    /// Cycles elapsed within the phase.
    pub const fn cycles(&self) -> u64 {
        self.end_cycles.saturating_sub(self.begin_cycles)
    }

    /// Instructions per cycle; zero before the first cycle.
    pub fn ipc(&self) -> f64 {
        let cycles = self.cycles();
        if cycles == 0 {
            0.0
        } else {
            self.instrs() as f64 / cycles as f64
        }
    }

    /// Total conditional and unconditional branches retired.
    pub fn total_branches(&self) -> u64 {
        self.branch_type_counts.iter().sum()
    }

    /// Total mispredicted branches.
    pub fn total_mispredictions(&self) -> u64 {
        self.branch_type_misses.iter().sum()
    }

    /// Mispredictions per thousand instructions.
    pub fn branch_mpki(&self) -> f64 {
        let instrs = self.instrs();
        if instrs == 0 {
            0.0
        } else {
            self.total_mispredictions() as f64 * 1000.0 / instrs as f64
        }
    }
}

/// Per-cache statistics for one phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Cache name (e.g. `cpu0_L1I`).
    pub name: String,
    /// Tag hits, indexed by [`AccessType::index`].
    pub hits: [u64; AccessType::COUNT],
    /// Tag misses, indexed by [`AccessType::index`].
    pub misses: [u64; AccessType::COUNT],
    /// Prefetches the prefetcher asked for.
    pub pf_requested: u64,
    /// Prefetches accepted into the prefetch queue.
    pub pf_issued: u64,
    /// Prefetched blocks later hit by a demand access.
    pub pf_useful: u64,
    /// Prefetched blocks evicted without a demand hit.
    pub pf_useless: u64,
    /// Prefetched blocks filled into this level.
    pub pf_fill: u64,
    /// Sum of miss latencies in cycles.
    pub total_miss_latency: u64,
}

impl CacheStats {
    /// Creates zeroed statistics for the named cache.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Hits across every access type.
    pub fn total_hits(&self) -> u64 {
        self.hits.iter().sum()
    }

    /// Misses across every access type.
    pub fn total_misses(&self) -> u64 {
        self.misses.iter().sum()
    }

    /// Demand lookups: every lookup except those originating from a prefetch request.
    pub fn fetch_packets(&self) -> u64 {
        (self.total_hits() + self.total_misses()).saturating_sub(self.pf_requested)
    }

    /// Average miss latency in cycles.
    pub fn avg_miss_latency(&self) -> f64 {
        let misses = self.total_misses();
        if misses == 0 {
            0.0
        } else {
            self.total_miss_latency as f64 / misses as f64
        }
    }

    pub(crate) const fn record_hit(&mut self, kind: AccessType) {
        self.hits[kind.index()] += 1;
    }

    pub(crate) const fn record_miss(&mut self, kind: AccessType) {
        self.misses[kind.index()] += 1;
    }
}

/// DRAM channel statistics for one phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DramStats {
    /// Channel name.
    pub name: String,
    /// Read requests serviced.
    pub reads: u64,
    /// Write requests serviced.
    pub writes: u64,
    /// Requests that found their row open.
    pub row_buffer_hits: u64,
    /// Requests that needed a row activation.
    pub row_buffer_misses: u64,
}

impl DramStats {
    /// Creates zeroed statistics for the named channel.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
