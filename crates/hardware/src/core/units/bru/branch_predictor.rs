//! Branch Predictor Interface.
//!
//! This module defines the `BranchPredictor` trait that all direction
//! predictors implement. The core treats a predictor as a black box with two
//! operations: `predict` before a branch resolves and `update` once it has.

use std::fmt;

use crate::trace::BranchKind;

/// Trait for branch direction prediction algorithms.
pub trait BranchPredictor: fmt::Debug {
    /// One-time setup before the first phase.
    fn initialize(&mut self) {}

    /// Predicts whether the branch at `ip` will be taken.
    ///
    /// # Arguments
    ///
    /// * `ip` - Address of the branch instruction
    fn predict(&self, ip: u64) -> bool;

    /// Trains the predictor with a resolved branch.
    ///
    /// Called exactly once per resolved branch, after `predict`.
    ///
    /// # Arguments
    ///
    /// * `ip` - Address of the branch instruction
    /// * `taken` - Whether the branch was actually taken
    /// * `predicted` - What `predict` returned for this branch
    /// * `target` - Resolved target address
    /// * `kind` - Classified branch type
    fn update(&mut self, ip: u64, taken: bool, predicted: bool, target: u64, kind: BranchKind);
}
