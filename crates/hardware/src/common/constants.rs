//! Global Simulator Constants.
//!
//! This module defines system-wide constants used across the simulator. It includes:
//! 1. **Memory Constants:** Cache block geometry shared by every cache level.
//! 2. **Scheduling Constants:** The deadlock threshold enforced by the phase driver.
//! 3. **Trace Constants:** Register identifiers the trace format reserves for branch decoding.

/// Cache block (line) size in bytes.
pub const BLOCK_SIZE: u64 = 64;

/// Number of bits to shift to convert between byte addresses and block numbers.
pub const LOG2_BLOCK_SIZE: u32 = 6;

/// Consecutive zero-progress cycles after which the simulation is declared deadlocked.
pub const DEADLOCK_CYCLE: u64 = 500;

/// Default capacity of a core's trace input queue.
pub const IN_QUEUE_SIZE: usize = 64;

/// Register id the trace format uses for the stack pointer.
pub const REG_STACK_POINTER: u8 = 6;

/// Register id the trace format uses for the flags register.
pub const REG_FLAGS: u8 = 25;

/// Register id the trace format uses for the instruction pointer.
pub const REG_INSTRUCTION_POINTER: u8 = 26;
