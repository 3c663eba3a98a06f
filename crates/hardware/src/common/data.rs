//! Memory Access Types.
//!
//! This module defines the classification of memory requests flowing through the
//! cache hierarchy. These types are used for the following:
//! 1. **Statistics Tracking:** Hit and miss counters are kept per access type.
//! 2. **Fill Policy:** Prefetches and demand fills are treated differently on install.
//! 3. **Write Handling:** Stores and write-backs mark lines dirty.

use serde::Serialize;

/// Type of memory access travelling through a cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AccessType {
    /// Demand read (instruction fetch or data load).
    Load,

    /// Hardware prefetch generated by a prefetcher.
    Prefetch,

    /// Store or write-back of a dirty line evicted from an upper level.
    Write,
}

impl AccessType {
    /// Number of access types; sizes per-type statistics arrays.
    pub const COUNT: usize = 3;

    /// All access types in statistics index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Load,
        Self::Prefetch,
        Self::Write,
    ];

    /// Returns the statistics array index for this access type.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for accesses issued on behalf of the program rather than a prefetcher.
    pub const fn is_demand(self) -> bool {
        !matches!(self, Self::Prefetch)
    }

    /// Upper-case label used in statistics output.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Load => "LOAD",
            Self::Prefetch => "PREFETCH",
            Self::Write => "WRITE",
        }
    }
}
