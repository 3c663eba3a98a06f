//! Cache Replacement Policies.
//!
//! Implements the algorithms for selecting victim blocks in set-associative caches.
//!
//! # Policies
//!
//! - `Fifo`: First-In, First-Out.
//! - `Lru`: Least Recently Used.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

use std::fmt;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;

use crate::config::ReplacementPolicy as PolicyType;

/// Trait for cache replacement policies.
///
/// Defines the interface for updating usage state and selecting victim blocks.
/// The cache fills invalid ways before consulting the policy.
pub trait ReplacementPolicy: fmt::Debug {
    /// Updates the policy state when a resident block is hit.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    /// * `way` - The way index within the set that was accessed.
    fn on_hit(&mut self, set: usize, way: usize);

    /// Updates the policy state when a block is filled into `way`.
    fn on_fill(&mut self, set: usize, way: usize);

    /// Selects a victim way to evict from a full set.
    ///
    /// # Returns
    ///
    /// The index of the way to evict.
    fn victim(&self, set: usize) -> usize;
}

/// Builds the configured policy for a cache of the given geometry.
pub fn build(policy: PolicyType, sets: usize, ways: usize) -> Box<dyn ReplacementPolicy> {
    match policy {
        PolicyType::Lru => Box::new(LruPolicy::new(sets, ways)),
        PolicyType::Fifo => Box::new(FifoPolicy::new(sets, ways)),
    }
}
