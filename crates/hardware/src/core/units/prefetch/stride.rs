//! Stride Prefetcher.
//!
//! A prefetcher that detects constant stride patterns in memory accesses.
//! It maintains a Reference Prediction Table (RPT) tracking the last address
//! and stride of each load instruction (indexed by its ip).
//!
//! Prefetching is triggered only when a stable stride pattern is established
//! (confidence threshold is met).
//!
//! # Performance
//!
//! - **Space Complexity:** O(T) where T is the table size (typically 64-256 entries)
//! - **Best Case:** Regular strided patterns (array traversals, matrix operations)
//! - **Worst Case:** Irregular or random access patterns (linked lists, hash tables)

use super::{CacheAccess, PrefetchContext, Prefetcher};
use crate::common::addr::block_address;

/// Confidence at which the stride is trusted.
const CONFIDENT: u8 = 3;

/// Entry in the Reference Prediction Table.
#[derive(Debug, Default, Clone, Copy)]
struct StrideEntry {
    /// Tag identifying the instruction that owns this entry.
    ip: u64,
    /// The last address accessed by this instruction.
    last_addr: u64,
    /// The detected stride (difference between consecutive accesses).
    stride: i64,
    /// Confidence counter (2-bit saturating).
    confidence: u8,
}

/// Stride Prefetcher state.
#[derive(Debug, Clone)]
pub struct StridePrefetcher {
    /// Reference Prediction Table.
    table: Vec<StrideEntry>,
    /// Mask used to index the table.
    table_mask: usize,
    /// Number of strides to prefetch ahead.
    degree: usize,
}

impl StridePrefetcher {
    /// Creates a new Stride prefetcher.
    ///
    /// # Arguments
    ///
    /// * `table_size` - Number of entries in the tracking table (rounded up to a power of 2).
    /// * `degree` - The number of strides to prefetch ahead.
    pub fn new(table_size: usize, degree: usize) -> Self {
        let size = table_size.max(1).next_power_of_two();
        Self {
            table: vec![StrideEntry::default(); size],
            table_mask: size - 1,
            degree: degree.max(1),
        }
    }
}

impl Prefetcher for StridePrefetcher {
    fn name(&self) -> &'static str {
        "stride"
    }

    /// Updates the entry for `access.ip`. Once the stride has been seen
    /// `CONFIDENT` times in a row, prefetches `degree` strides ahead.
    fn cache_operate(&mut self, cache: &mut dyn PrefetchContext, access: &CacheAccess) -> u32 {
        let idx = ((access.ip >> 2) as usize) & self.table_mask;
        let entry = &mut self.table[idx];

        if entry.ip != access.ip {
            *entry = StrideEntry {
                ip: access.ip,
                last_addr: access.addr,
                ..StrideEntry::default()
            };
            return access.metadata;
        }

        let current_stride = access.addr.wrapping_sub(entry.last_addr) as i64;
        entry.last_addr = access.addr;

        if current_stride != 0 && current_stride == entry.stride {
            if entry.confidence < CONFIDENT {
                entry.confidence += 1;
            }
        } else if entry.confidence > 0 {
            entry.confidence -= 1;
        } else {
            entry.stride = current_stride;
        }

        if entry.confidence >= CONFIDENT {
            let stride = entry.stride;
            for k in 1..=self.degree as i64 {
                let target = access.addr.wrapping_add_signed(stride.wrapping_mul(k));
                if !cache.issue_prefetch(block_address(target), true, access.metadata) {
                    break;
                }
            }
        }
        access.metadata
    }
}
