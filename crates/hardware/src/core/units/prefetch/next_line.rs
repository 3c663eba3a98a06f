//! Next-Line Prefetcher.
//!
//! A simple spatial prefetcher that requests the next sequential block(s)
//! after every lookup. This exploits the spatial locality common in
//! instruction streams and sequential data arrays.

use super::{CacheAccess, PrefetchContext, Prefetcher};
use crate::common::addr::block_address;
use crate::common::constants::BLOCK_SIZE;

/// Next-Line Prefetcher state.
#[derive(Debug, Clone)]
pub struct NextLinePrefetcher {
    /// Number of subsequent blocks to prefetch (prefetch degree).
    degree: usize,
}

impl NextLinePrefetcher {
    /// Creates a new Next-Line prefetcher.
    ///
    /// # Arguments
    ///
    /// * `degree` - The number of blocks to prefetch ahead (0 is treated as 1).
    pub fn new(degree: usize) -> Self {
        Self {
            degree: degree.max(1),
        }
    }
}

impl Prefetcher for NextLinePrefetcher {
    fn name(&self) -> &'static str {
        "next_line"
    }

    /// Requests the `degree` blocks following the accessed one.
    ///
    /// Stops at the first request the cache refuses.
    fn cache_operate(&mut self, cache: &mut dyn PrefetchContext, access: &CacheAccess) -> u32 {
        let base = block_address(access.addr);
        for k in 1..=self.degree as u64 {
            let target = base.wrapping_add(BLOCK_SIZE * k);
            if !cache.issue_prefetch(target, true, access.metadata) {
                break;
            }
        }
        access.metadata
    }
}
