//! Hardware prefetcher implementations.
//!
//! This module contains the interface between a cache and its prefetcher, and the
//! prefetchers themselves. It provides:
//! 1. **`PrefetchContext`:** What a prefetcher may ask of its owning cache (MSHR
//!    occupancy, residency, and issuing prefetches).
//! 2. **`Prefetcher`:** Hooks the cache calls on accesses, fills, branch events, and
//!    once per cycle.
//! 3. **Implementations:** Fetch-directed (FDIP), next-line, and stride prefetchers.

use std::fmt;

use crate::common::data::AccessType;
use crate::trace::BranchKind;

/// Fetch-directed instruction prefetcher.
pub mod fdip;

/// Next-line prefetcher (prefetches sequential cache lines).
pub mod next_line;

/// Stride prefetcher (detects constant-stride access patterns).
pub mod stride;

pub use self::fdip::FdipPrefetcher;
pub use self::next_line::NextLinePrefetcher;
pub use self::stride::StridePrefetcher;

/// The owning cache as seen by its prefetcher.
pub trait PrefetchContext {
    /// Outstanding misses currently tracked (MSHR entries in use).
    fn outstanding_miss_occupancy(&self) -> usize;

    /// Maximum number of outstanding misses (MSHR entries).
    fn outstanding_miss_capacity(&self) -> usize;

    /// Requests a prefetch of the block containing `addr`.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address to prefetch.
    /// * `fill_this_level` - Whether the block is filled into this cache, or only into lower levels.
    /// * `metadata` - Opaque value passed along with the request.
    ///
    /// # Returns
    ///
    /// `true` if the cache accepted the request.
    fn issue_prefetch(&mut self, addr: u64, fill_this_level: bool, metadata: u32) -> bool;

    /// Whether the block containing `addr` is present in the cache.
    fn is_resident(&self, addr: u64) -> bool;

    /// Whether fewer than half of the outstanding-miss entries are in use.
    fn below_half_occupancy(&self) -> bool {
        self.outstanding_miss_occupancy() < self.outstanding_miss_capacity() / 2
    }
}

/// A tag lookup observed by the prefetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheAccess {
    /// Accessed address.
    pub addr: u64,
    /// Address of the instruction that caused the access.
    pub ip: u64,
    /// Whether the lookup hit.
    pub hit: bool,
    /// Whether the hit was on a block brought in by a prefetch.
    pub useful_prefetch: bool,
    /// Kind of access.
    pub kind: AccessType,
    /// Metadata carried by the request.
    pub metadata: u32,
}

/// A block filled into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheFill {
    /// Filled block address.
    pub addr: u64,
    /// Set the block went into.
    pub set: usize,
    /// Way the block went into.
    pub way: usize,
    /// Whether the fill answers a prefetch.
    pub prefetch: bool,
    /// Address of the evicted block, if a valid block was replaced.
    pub evicted_addr: Option<u64>,
    /// Metadata carried by the fill.
    pub metadata: u32,
}

/// A resolved branch reported by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchEvent {
    /// Address of the branch instruction.
    pub ip: u64,
    /// Classified branch type.
    pub kind: BranchKind,
    /// Resolved target address.
    pub target: u64,
    /// Size in bytes of the fetch the target begins.
    pub size: u8,
}

/// Trait for cache prefetcher implementations.
///
/// Prefetchers observe the owning cache and generate prefetch requests through
/// a [`PrefetchContext`]. Every hook has a no-op default.
pub trait Prefetcher: fmt::Debug {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// One-time setup before the first phase.
    fn initialize(&mut self) {}

    /// Observes a demand or upper-level lookup.
    ///
    /// # Returns
    ///
    /// The metadata to attach to the request as it continues.
    fn cache_operate(&mut self, _cache: &mut dyn PrefetchContext, access: &CacheAccess) -> u32 {
        access.metadata
    }

    /// Observes a block filled into the cache.
    ///
    /// # Returns
    ///
    /// The metadata to store with the block.
    fn cache_fill(&mut self, _cache: &mut dyn PrefetchContext, fill: &CacheFill) -> u32 {
        fill.metadata
    }

    /// Observes a resolved branch.
    fn branch_operate(&mut self, _branch: &BranchEvent) {}

    /// Called once per cache cycle.
    fn cycle_operate(&mut self, _cache: &mut dyn PrefetchContext) {}

    /// Human-readable dump of internal state for deadlock diagnostics.
    fn deadlock_state(&self) -> String {
        String::new()
    }
}
