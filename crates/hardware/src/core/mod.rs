//! Core and on-core units.
//!
//! This module contains the trace-driven core and the units it is built from:
//! branch predictors, caches, and prefetchers.

/// Trace-driven core.
pub mod cpu;

/// Branch predictors, caches, and prefetchers.
pub mod units;

pub use self::cpu::Cpu;
