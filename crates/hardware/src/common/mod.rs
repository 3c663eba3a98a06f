//! Common utilities and types used throughout the simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Address Helpers:** Block alignment and sequencing.
//! 2. **Constants:** Block geometry, the deadlock threshold, and reserved trace registers.
//! 3. **Memory Access:** Classification of requests (load, RFO, prefetch, write, translation).
//! 4. **Error Handling:** Trace, configuration, and simulation error types.

/// Block address helpers.
pub mod addr;

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use addr::{block_address, next_block};
pub use constants::{BLOCK_SIZE, DEADLOCK_CYCLE, LOG2_BLOCK_SIZE};
pub use data::AccessType;
pub use error::{ConfigError, SimError, TraceError};
