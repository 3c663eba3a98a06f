//! Bimodal Branch Predictor.
//!
//! A table of 2-bit saturating counters indexed by the branch address. Each
//! branch learns its own bias, independent of the path that reached it.

use super::BranchPredictor;
use crate::trace::BranchKind;

/// Largest counter value (strongly taken).
const COUNTER_MAX: u8 = 3;

/// Bimodal predictor state.
#[derive(Debug, Clone)]
pub struct BimodalPredictor {
    /// 2-bit saturating counters, initialized weakly not-taken.
    table: Vec<u8>,
    /// Mask for indexing the table.
    mask: u64,
}

impl BimodalPredictor {
    /// Creates a predictor with `table_size` counters (rounded up to a power of two).
    pub fn new(table_size: usize) -> Self {
        let size = table_size.max(1).next_power_of_two();
        Self {
            table: vec![1; size],
            mask: size as u64 - 1,
        }
    }

    fn index(&self, ip: u64) -> usize {
        // Spread nearby branches over the table.
        ((ip ^ (ip >> 12)) & self.mask) as usize
    }
}

impl BranchPredictor for BimodalPredictor {
    fn predict(&self, ip: u64) -> bool {
        self.table[self.index(ip)] >= 2
    }

    fn update(&mut self, ip: u64, taken: bool, _predicted: bool, _target: u64, _kind: BranchKind) {
        let idx = self.index(ip);
        let counter = &mut self.table[idx];
        if taken {
            *counter = (*counter + 1).min(COUNTER_MAX);
        } else {
            *counter = counter.saturating_sub(1);
        }
    }
}
