//! Memory system and machine assembly.
//!
//! This module organizes the components below the core:
//! the channels linking hierarchy levels, the DRAM model, and the builder
//! that assembles a complete [`System`].

/// System builder for assembling the machine.
pub mod builder;

/// Bounded request/response channels between hierarchy levels.
pub mod channel;

/// DRAM channel and row-buffer timing.
pub mod memory;

pub use builder::System;
pub use channel::{Channel, ChannelHandle, Request, Response};
