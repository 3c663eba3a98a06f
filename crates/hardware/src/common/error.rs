//! Simulator error definitions.
//!
//! This module defines the error types surfaced by the simulator. It provides:
//! 1. **Trace Errors:** Failures opening or reading instruction traces.
//! 2. **Configuration Errors:** Invalid or missing run parameters, reported before any phase begins.
//! 3. **Simulation Errors:** The fatal deadlock condition and the single-core invariant.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening or reading an instruction trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be opened.
    #[error("could not open trace '{path}': {source}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading from an already open trace failed.
    #[error("failed reading trace '{name}': {source}")]
    Read {
        /// Display name of the trace.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Errors in the run configuration, detected before simulation starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No snapshot destination was configured.
    #[error("no snapshot folder given")]
    MissingSnapshotFolder,

    /// The run names no traces at all.
    #[error("at least one trace is required")]
    NoTraces,

    /// A phase maps a core to a trace slot that does not exist.
    #[error("phase '{phase}' maps core {core} to trace {index}, but only {available} traces are loaded")]
    TraceIndexOutOfRange {
        /// Phase name.
        phase: String,
        /// Core whose mapping is invalid.
        core: usize,
        /// Requested trace slot.
        index: usize,
        /// Number of traces available.
        available: usize,
    },

    /// A cache level has an unusable geometry.
    #[error("cache '{name}': {reason}")]
    InvalidCache {
        /// Cache name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A branch predictor configuration is unusable.
    #[error("branch predictor: {0}")]
    InvalidPredictor(String),

    /// A core parameter is unusable.
    #[error("core: {0}")]
    InvalidCore(String),

    /// The configuration JSON could not be parsed.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that end a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// No component made progress for the deadlock threshold.
    ///
    /// This is a structural modeling defect, never a data error; the run cannot continue.
    #[error("deadlock: no forward progress for {stalled_cycles} cycles (detected at cycle {cycle})")]
    Deadlock {
        /// Scheduler cycle at which the threshold was reached.
        cycle: u64,
        /// Consecutive zero-progress cycles observed.
        stalled_cycles: u64,
        /// Diagnostic state dumped by each operable, in dispatch order.
        dumps: Vec<String>,
    },

    /// The environment does not hold exactly one core.
    #[error("exactly one simulated core is supported per run, found {0}")]
    UnsupportedCoreCount(usize),

    /// A trace failed while the phase was feeding it.
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// The run configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
