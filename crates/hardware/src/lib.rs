//! Trace-driven microarchitectural simulator library.
//!
//! This crate replays recorded instruction traces through a cycle-stepped model
//! of a core and its memory hierarchy:
//! 1. **Scheduling:** The phase driver ticks every component once per cycle, orders
//!    components by clock domain, detects deadlock, and captures snapshots.
//! 2. **Traces:** Fixed-layout binary instruction records with branch classification.
//! 3. **Core:** A trace-driven core with a reorder buffer and branch predictors.
//! 4. **Memory:** Set-associative caches, prefetchers (including FDIP), and DRAM.
//! 5. **Results:** Per-phase core, cache, and DRAM statistics.
//!
//! # Examples
//!
//! ```no_run
//! use tracesim_core::{Config, System, sim};
//!
//! let config = Config::from_json(r#"{
//!     "run": { "traces": ["bench.trace"], "snapshot_folder": "out" }
//! }"#)?;
//! let phases = config.run.phases()?;
//! let mut traces = config.run.open_traces()?;
//! let mut replacement = config.run.open_replacement()?;
//! let mut system = System::new(&config)?;
//!
//! let results = sim::run(&mut system, &phases, &mut traces, replacement.as_mut())?;
//! println!("IPC {:.3}", results[0].sim_cpu_stats[0].ipc());
//! # Ok::<(), tracesim_core::SimError>(())
//! ```

/// Common types and constants (addresses, access types, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Trace-driven core and its units (predictors, caches, prefetchers).
pub mod core;
/// Cycle-stepped scheduling: operables, environments, phases, and drivers.
pub mod sim;
/// Memory hierarchy plumbing and machine assembly.
pub mod soc;
/// Simulation statistics.
pub mod stats;
/// Instruction trace records and readers.
pub mod trace;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Errors surfaced by a run.
pub use crate::common::error::{ConfigError, SimError, TraceError};
/// Trace-driven core.
pub use crate::core::Cpu;
/// Complete single-core machine; construct with `System::new`.
pub use crate::soc::System;
