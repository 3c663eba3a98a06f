//! Typed views over the components of one simulated machine.
//!
//! The phase driver never owns components directly. It reaches them through an
//! [`Environment`], which exposes:
//! 1. **Operables:** Every timed component, addressed by a stable index.
//! 2. **Cores:** The trace-consuming cores, addressed by cpu number.
//! 3. **Statistics:** Cache and DRAM counters for phase results and snapshots.

use crate::sim::operable::Operable;
use crate::stats::{CacheStats, CoreStats, DramStats};
use crate::trace::Instruction;

/// The trace-facing side of a core.
pub trait CoreModel {
    /// Index of this core in the machine.
    fn cpu(&self) -> usize;

    /// Free slots in the input queue.
    fn input_capacity(&self) -> usize;

    /// Appends one instruction to the input queue.
    fn push_instruction(&mut self, instr: Instruction);

    /// Instructions retired since the machine was built.
    fn retired(&self) -> u64;

    /// Core cycles elapsed since the machine was built.
    fn current_cycle(&self) -> u64;

    /// Counters accumulated since the current phase began.
    fn sim_stats(&self) -> &CoreStats;

    /// Counters frozen when this core finished the current phase.
    fn roi_stats(&self) -> &CoreStats;

    /// Instructions retired within the current phase.
    fn phase_instrs(&self) -> u64 {
        self.retired().saturating_sub(self.sim_stats().begin_instrs)
    }

    /// Cycles elapsed within the current phase.
    fn phase_cycles(&self) -> u64 {
        self.current_cycle()
            .saturating_sub(self.sim_stats().begin_cycles)
    }
}

/// A simulated machine as seen by the phase and run drivers.
///
/// Operable indices are stable for the life of the environment; the driver keeps
/// its own dispatch order as a permutation of them.
pub trait Environment {
    /// Number of timed components.
    fn operable_count(&self) -> usize;

    /// The component at `index`.
    fn operable(&self, index: usize) -> Option<&dyn Operable>;

    /// Mutable access to the component at `index`.
    fn operable_mut(&mut self, index: usize) -> Option<&mut dyn Operable>;

    /// Number of cores.
    fn core_count(&self) -> usize;

    /// The core numbered `cpu`.
    fn core(&self, cpu: usize) -> Option<&dyn CoreModel>;

    /// Mutable access to the core numbered `cpu`.
    fn core_mut(&mut self, cpu: usize) -> Option<&mut dyn CoreModel>;

    /// Phase counters of every cache, in a fixed order.
    fn cache_stats(&self) -> Vec<CacheStats>;

    /// Region-of-interest counters of every cache.
    fn roi_cache_stats(&self) -> Vec<CacheStats>;

    /// Phase counters of every DRAM channel.
    fn dram_stats(&self) -> Vec<DramStats> {
        Vec::new()
    }

    /// Region-of-interest counters of every DRAM channel.
    fn roi_dram_stats(&self) -> Vec<DramStats> {
        Vec::new()
    }
}
