//! Instruction traces.
//!
//! This module turns recorded instruction traces into the instruction stream a core
//! consumes. It provides:
//! 1. **Records:** The three fixed binary layouts and their decoded form.
//! 2. **Branch decoding:** Control-transfer kinds inferred from register usage.
//! 3. **Reading:** A lazy, finite reader with lookahead and optional repeat.

/// Branch classification.
pub mod branch;

/// Decoded instructions with resolved branch targets.
pub mod instruction;

/// Lazy trace reader.
pub mod reader;

/// Binary record layouts.
pub mod record;

pub use branch::BranchKind;
pub use instruction::Instruction;
pub use reader::TraceReader;
pub use record::{InstructionRecord, ProgramState, TraceFormat};
