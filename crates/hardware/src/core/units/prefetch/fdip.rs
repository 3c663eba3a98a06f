//! Fetch-Directed Instruction Prefetcher (FDIP).
//!
//! Branch targets resolved by the core are queued as pending prefetches and
//! drained one per cycle, gated on MSHR occupancy so prefetch traffic never
//! crowds out demand misses. Demand misses additionally trigger an immediate
//! next-line prefetch under the same gate.
//!
//! Two bounded FIFOs hold all of the state:
//! - the **pending queue** (default 128 entries): on overflow the oldest entry is dropped;
//! - the **recent-issue filter** (default 4 entries): suppresses re-issuing a block
//!   that was prefetched moments ago.

use std::collections::VecDeque;

use super::{BranchEvent, CacheAccess, PrefetchContext, Prefetcher};
use crate::common::addr::{block_address, next_block};

/// Default pending queue capacity.
pub const PENDING_CAPACITY: usize = 128;

/// Default recent-issue filter capacity.
pub const RECENT_CAPACITY: usize = 4;

/// A queued branch-target prefetch. Unique by `block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPrefetch {
    /// Block containing the branch target.
    pub block: u64,
    /// The branch target itself.
    pub target: u64,
    /// Size of the fetch beginning at the target.
    pub size: u8,
}

/// Counters describing what happened to branch-target prefetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FdipCounters {
    /// Entries appended to the pending queue.
    pub enqueued: u64,
    /// Entries dropped from the head on overflow.
    pub evicted: u64,
    /// Entries discarded because the target was already cached.
    pub resident: u64,
    /// Entries discarded because the block was recently issued.
    pub filtered: u64,
    /// Prefetches issued from the pending queue.
    pub issued: u64,
    /// Next-line prefetches issued on demand misses.
    pub miss_issued: u64,
}

/// FDIP state owned by one cache.
#[derive(Debug, Clone)]
pub struct FdipPrefetcher {
    pending: VecDeque<PendingPrefetch>,
    recent: VecDeque<u64>,
    pending_capacity: usize,
    recent_capacity: usize,
    counters: FdipCounters,
}

impl FdipPrefetcher {
    /// Creates a prefetcher with the default queue and filter capacities.
    pub fn new() -> Self {
        Self::with_capacity(PENDING_CAPACITY, RECENT_CAPACITY)
    }

    /// Creates a prefetcher with explicit capacities.
    ///
    /// # Arguments
    ///
    /// * `pending_capacity` - Maximum queued branch targets.
    /// * `recent_capacity` - Number of recently issued blocks remembered.
    pub fn with_capacity(pending_capacity: usize, recent_capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(pending_capacity + 1),
            recent: VecDeque::with_capacity(recent_capacity + 1),
            pending_capacity,
            recent_capacity,
            counters: FdipCounters::default(),
        }
    }

    /// Queued branch targets, oldest first.
    pub fn pending(&self) -> impl ExactSizeIterator<Item = &PendingPrefetch> + '_ {
        self.pending.iter()
    }

    /// Recently issued blocks, oldest first.
    pub fn recent(&self) -> impl ExactSizeIterator<Item = u64> + '_ {
        self.recent.iter().copied()
    }

    /// Number of queued branch targets.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of blocks in the recent-issue filter.
    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    /// Event counters.
    pub const fn counters(&self) -> FdipCounters {
        self.counters
    }

    fn recently_issued(&self, block: u64) -> bool {
        self.recent.contains(&block)
    }

    fn remember(&mut self, block: u64) {
        self.recent.push_back(block);
        if self.recent.len() > self.recent_capacity {
            let _ = self.recent.pop_front();
        }
    }
}

impl Default for FdipPrefetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Prefetcher for FdipPrefetcher {
    fn name(&self) -> &'static str {
        "fdip"
    }

    /// Queues the branch target's block unless it is null, already pending, or recently issued.
    fn branch_operate(&mut self, branch: &BranchEvent) {
        let block = block_address(branch.target);
        if block == 0 || self.pending.iter().any(|entry| entry.block == block) {
            return;
        }

        if self.recently_issued(block) {
            self.counters.filtered += 1;
        } else {
            self.pending.push_back(PendingPrefetch {
                block,
                target: branch.target,
                size: branch.size,
            });
            self.counters.enqueued += 1;
        }

        if self.pending.len() > self.pending_capacity {
            let _ = self.pending.pop_front();
            self.counters.evicted += 1;
        }
    }

    /// On a miss, and while MSHR occupancy is below half, prefetches the next block.
    fn cache_operate(&mut self, cache: &mut dyn PrefetchContext, access: &CacheAccess) -> u32 {
        if !access.hit && cache.below_half_occupancy() {
            let block = next_block(block_address(access.addr));
            let _ = cache.issue_prefetch(block, true, access.metadata);
            self.remember(block);
            self.counters.miss_issued += 1;
        }
        access.metadata
    }

    /// Processes at most one pending entry, only while MSHR occupancy is below half.
    fn cycle_operate(&mut self, cache: &mut dyn PrefetchContext) {
        if self.pending.is_empty() || !cache.below_half_occupancy() {
            return;
        }
        let Some(head) = self.pending.pop_front() else {
            return;
        };

        if cache.is_resident(head.target) {
            self.counters.resident += 1;
        } else if self.recently_issued(head.block) {
            self.counters.filtered += 1;
        } else {
            let _ = cache.issue_prefetch(head.block, true, 0);
            self.remember(head.block);
            self.counters.issued += 1;
        }
    }

    fn deadlock_state(&self) -> String {
        let head = self
            .pending
            .front()
            .map_or_else(|| "none".to_string(), |entry| format!("{:#x}", entry.block));
        format!(
            "fdip: {} pending (head {head}), {} recent, {:?}",
            self.pending.len(),
            self.recent.len(),
            self.counters
        )
    }
}
