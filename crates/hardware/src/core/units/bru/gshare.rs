//! GShare Branch Predictor.
//!
//! GShare correlates global branch history with the branch address using an XOR
//! hash. This allows the predictor to distinguish the same branch instruction
//! in different execution contexts.
//!
//! # Performance
//!
//! - **Space Complexity:** O(T) 2-bit counters for a table of T entries
//! - **Best Case:** Correlated branches where outcome depends on recent history
//! - **Worst Case:** Uncorrelated branches or history length too short/long for pattern

use super::BranchPredictor;
use crate::trace::BranchKind;

/// GShare Predictor structure.
#[derive(Debug, Clone)]
pub struct GSharePredictor {
    /// Global History Register storing recent branch outcomes.
    ghr: u64,
    /// Pattern History Table containing 2-bit saturating counters.
    pht: Vec<u8>,
    /// Mask applied to both the address and the history.
    mask: u64,
}

impl GSharePredictor {
    /// Creates a new GShare Predictor with `table_size` counters (rounded up to a power of two).
    pub fn new(table_size: usize) -> Self {
        let size = table_size.max(1).next_power_of_two();
        Self {
            ghr: 0,
            pht: vec![1; size],
            mask: size as u64 - 1,
        }
    }

    /// Calculates the index into the Pattern History Table.
    ///
    /// Computes the XOR of the address (shifted) and the Global History Register.
    fn index(&self, ip: u64) -> usize {
        (((ip >> 2) ^ self.ghr) & self.mask) as usize
    }
}

impl BranchPredictor for GSharePredictor {
    /// Returns true if the 2-bit counter at the hashed index is 2 or 3 (Taken).
    fn predict(&self, ip: u64) -> bool {
        self.pht[self.index(ip)] >= 2
    }

    /// Updates the 2-bit saturating counter in the PHT and shifts the new
    /// outcome into the Global History Register.
    fn update(&mut self, ip: u64, taken: bool, _predicted: bool, _target: u64, _kind: BranchKind) {
        let idx = self.index(ip);
        let counter = self.pht[idx];

        if taken && counter < 3 {
            self.pht[idx] += 1;
        } else if !taken && counter > 0 {
            self.pht[idx] -= 1;
        }

        self.ghr = ((self.ghr << 1) | u64::from(taken)) & self.mask;
    }
}
