//! The per-cycle tick contract shared by every timed component.
//!
//! This module provides:
//! 1. **`Clock`:** A component's clock domain relative to the core clock. Its fractional
//!    `leap` value is the scheduling priority the phase driver sorts by.
//! 2. **`Operable`:** The trait the phase driver ticks once per simulated cycle, with
//!    phase lifecycle hooks and a deadlock diagnostic dump.

/// Clock domain of one component.
///
/// `scale` is the number of core cycles per component cycle. A component with
/// `scale == 1.0` operates every core cycle; a slower one accumulates `scale - 1`
/// into `leap` each time it operates and skips a core cycle for every whole unit
/// accumulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    scale: f64,
    leap: f64,
    current_cycle: u64,
}

impl Clock {
    /// Creates a clock running `scale` core cycles per component cycle.
    ///
    /// Scales below 1.0 are clamped to 1.0.
    pub const fn new(scale: f64) -> Self {
        Self {
            scale: if scale >= 1.0 { scale } else { 1.0 },
            leap: 0.0,
            current_cycle: 0,
        }
    }

    /// Core cycles per component cycle.
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Accumulated fractional delay; lower values are dispatched earlier.
    pub const fn leap(&self) -> f64 {
        self.leap
    }

    /// Number of cycles this component has operated.
    pub const fn current_cycle(&self) -> u64 {
        self.current_cycle
    }

    /// Advances the clock by one core cycle.
    ///
    /// Returns `true` if the component should operate this cycle.
    pub fn advance(&mut self) -> bool {
        if self.leap >= 1.0 {
            self.leap -= 1.0;
            return false;
        }
        self.leap += self.scale - 1.0;
        self.current_cycle += 1;
        true
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// A timed hardware component advanced once per simulated cycle.
///
/// Implementors supply `operate` and access to their [`Clock`]. The phase driver
/// calls [`Operable::tick`], which consults the clock domain before operating.
pub trait Operable {
    /// Short component name used in diagnostics (e.g. `cpu0_L1D`).
    fn name(&self) -> &str;

    /// The component's clock domain.
    fn clock(&self) -> &Clock;

    /// Mutable access to the component's clock domain.
    fn clock_mut(&mut self) -> &mut Clock;

    /// Performs one component cycle.
    ///
    /// # Returns
    ///
    /// The amount of forward progress made (requests moved, instructions retired).
    /// A machine whose components all return 0 for long enough is deadlocked.
    fn operate(&mut self) -> u64;

    /// Whether the current phase is a warmup phase.
    fn warmup(&self) -> bool;

    /// Sets the warmup flag. Called by the phase driver before `begin_phase`.
    fn set_warmup(&mut self, warmup: bool);

    /// One-time setup before the first phase.
    fn initialize(&mut self) {}

    /// Called once at the start of every phase, after the warmup flag is set.
    fn begin_phase(&mut self) {}

    /// Called when core `cpu` completes the current phase.
    fn end_phase(&mut self, _cpu: usize) {}

    /// Human-readable dump of internal state for deadlock diagnostics.
    fn deadlock_state(&self) -> String {
        String::new()
    }

    /// Scheduling priority: ascending leap values are dispatched first.
    fn leap_value(&self) -> f64 {
        self.clock().leap()
    }

    /// Advances the component by one core cycle.
    ///
    /// Skips the cycle (returning 0 progress) while the clock domain is behind,
    /// otherwise operates and returns the progress made.
    fn tick(&mut self) -> u64 {
        if self.clock_mut().advance() {
            self.operate()
        } else {
            0
        }
    }
}
