//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! This policy evicts the oldest block in a set, regardless of how recently
//! it was accessed. It operates as a circular buffer (Round-Robin) for each set:
//! every fill into the way under the pointer advances it.
//!
//! # Performance
//!
//! - **Time Complexity:** O(1) for every operation
//! - **Space Complexity:** O(S) where S is the number of sets
//! - **Best Case:** Streaming accesses where all blocks have equal importance
//! - **Worst Case:** Workloads with strong temporal locality (may evict frequently-used blocks)

use super::ReplacementPolicy;

/// FIFO Policy state.
#[derive(Debug, Clone)]
pub struct FifoPolicy {
    /// Tracks the next way to be evicted for each set.
    next_way: Vec<usize>,
    /// Number of ways in the cache.
    ways: usize,
}

impl FifoPolicy {
    /// Creates a new FIFO policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            next_way: vec![0; sets],
            ways: ways.max(1),
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    /// Hits do not change insertion order.
    fn on_hit(&mut self, _set: usize, _way: usize) {}

    fn on_fill(&mut self, set: usize, way: usize) {
        if self.next_way[set] == way {
            self.next_way[set] = (way + 1) % self.ways;
        }
    }

    /// Returns the current round-robin pointer for the specified set.
    fn victim(&self, set: usize) -> usize {
        self.next_way[set]
    }
}
