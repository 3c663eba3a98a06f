//! Fluent builder for trace records.
//!
//! Register and memory operands fill the first free slot of their array, so a
//! builder never needs to know slot positions.

use std::num::{NonZeroU8, NonZeroU64};

use tracesim_core::common::constants::{REG_FLAGS, REG_INSTRUCTION_POINTER, REG_STACK_POINTER};
use tracesim_core::trace::InstructionRecord;

/// An ordinary register used by the helpers below.
pub const REG_GENERAL: u8 = 1;

/// Builds an [`InstructionRecord`] one operand at a time.
#[derive(Debug, Clone, Copy)]
pub struct RecordBuilder {
    record: InstructionRecord,
}

fn push<T: Copy>(slots: &mut [Option<T>], value: Option<T>) {
    if let Some(slot) = slots.iter_mut().find(|slot| slot.is_none()) {
        *slot = value;
    }
}

impl RecordBuilder {
    pub fn new(ip: u64) -> Self {
        Self {
            record: InstructionRecord {
                ip,
                ..InstructionRecord::default()
            },
        }
    }

    pub fn reads(mut self, reg: u8) -> Self {
        push(&mut self.record.source_registers, NonZeroU8::new(reg));
        self
    }

    pub fn writes(mut self, reg: u8) -> Self {
        push(&mut self.record.destination_registers, NonZeroU8::new(reg));
        self
    }

    pub fn load(mut self, addr: u64) -> Self {
        push(&mut self.record.source_memory, NonZeroU64::new(addr));
        self
    }

    pub fn store(mut self, addr: u64) -> Self {
        push(&mut self.record.destination_memory, NonZeroU64::new(addr));
        self
    }

    /// Marks the record as a branch with the given taken flag.
    pub fn branch(mut self, taken: bool) -> Self {
        self.record.is_branch = true;
        self.record.branch_taken = taken;
        self
    }

    pub fn build(self) -> InstructionRecord {
        self.record
    }
}

/// `r2 = r1 op r1`
pub fn alu(ip: u64) -> InstructionRecord {
    RecordBuilder::new(ip).reads(REG_GENERAL).writes(2).build()
}

/// Conditional branch: reads flags and ip, writes ip.
pub fn conditional(ip: u64, taken: bool) -> InstructionRecord {
    RecordBuilder::new(ip)
        .reads(REG_FLAGS)
        .reads(REG_INSTRUCTION_POINTER)
        .writes(REG_INSTRUCTION_POINTER)
        .branch(taken)
        .build()
}

/// Direct jump: writes ip only.
pub fn direct_jump(ip: u64) -> InstructionRecord {
    RecordBuilder::new(ip)
        .writes(REG_INSTRUCTION_POINTER)
        .branch(true)
        .build()
}

/// Direct call: reads and writes sp and ip.
pub fn direct_call(ip: u64) -> InstructionRecord {
    RecordBuilder::new(ip)
        .reads(REG_STACK_POINTER)
        .reads(REG_INSTRUCTION_POINTER)
        .writes(REG_STACK_POINTER)
        .writes(REG_INSTRUCTION_POINTER)
        .branch(true)
        .build()
}

/// `count` ALU records at consecutive 4-byte ips starting at `start`.
pub fn straight_line(start: u64, count: usize) -> Vec<InstructionRecord> {
    (0..count as u64).map(|i| alu(start + 4 * i)).collect()
}
