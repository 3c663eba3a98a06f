//! Simulation scheduling.
//!
//! This module drives a machine through its phases. It provides:
//! 1. **Operable:** The per-cycle tick contract and clock domains.
//! 2. **Environment:** Typed views over a machine's components.
//! 3. **Deadlock:** The forward-progress watchdog.
//! 4. **Phases:** Phase descriptors, snapshots, and phase results.
//! 5. **Drivers:** `run_phase` and `run`.

/// Forward-progress watchdog.
pub mod deadlock;
/// Phase and run drivers.
pub mod driver;
/// Machine views used by the drivers.
pub mod environment;
/// Tick contract and clock domains.
pub mod operable;
/// Phase descriptors and results.
pub mod phase;

pub use deadlock::{DeadlockMonitor, DeadlockState};
pub use driver::{run, run_phase};
pub use environment::{CoreModel, Environment};
pub use operable::{Clock, Operable};
pub use phase::{PhaseInfo, PhaseStats, Snapshot};
