//! Branch classification from register usage.
//!
//! Traces do not record branch types directly. The kind of control transfer is inferred
//! from which of the reserved registers (stack pointer, flags, instruction pointer) the
//! instruction reads and writes, plus whether it touches any other register.

use serde::Serialize;

use super::record::InstructionRecord;
use crate::common::constants::{REG_FLAGS, REG_INSTRUCTION_POINTER, REG_STACK_POINTER};

/// Control-transfer kind of a traced instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum BranchKind {
    /// Not a branch.
    #[default]
    NotBranch,
    /// Unconditional jump to a fixed target.
    DirectJump,
    /// Unconditional jump through a register.
    Indirect,
    /// Conditional branch depending on the flags.
    Conditional,
    /// Call to a fixed target.
    DirectCall,
    /// Call through a register.
    IndirectCall,
    /// Return from a call.
    Return,
    /// Any other write of the instruction pointer.
    Other,
}

impl BranchKind {
    /// Number of kinds; sizes per-kind statistics arrays.
    pub const COUNT: usize = 8;

    /// All kinds in statistics index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::NotBranch,
        Self::DirectJump,
        Self::Indirect,
        Self::Conditional,
        Self::DirectCall,
        Self::IndirectCall,
        Self::Return,
        Self::Other,
    ];

    /// Returns the statistics array index for this kind.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for every kind except [`BranchKind::NotBranch`].
    pub const fn is_branch(self) -> bool {
        !matches!(self, Self::NotBranch)
    }

    /// Returns `true` for kinds that always transfer control.
    pub const fn is_unconditional(self) -> bool {
        matches!(
            self,
            Self::DirectJump | Self::Indirect | Self::DirectCall | Self::IndirectCall | Self::Return
        )
    }

    /// Classifies a record from its register usage.
    ///
    /// A record flagged as a branch by the tracer whose registers match no rule is
    /// reported as [`BranchKind::Other`].
    pub fn classify(record: &InstructionRecord) -> Self {
        let writes_sp = record.registers_written().any(|r| r == REG_STACK_POINTER);
        let writes_ip = record
            .registers_written()
            .any(|r| r == REG_INSTRUCTION_POINTER);
        let reads_sp = record.registers_read().any(|r| r == REG_STACK_POINTER);
        let reads_flags = record.registers_read().any(|r| r == REG_FLAGS);
        let reads_ip = record.registers_read().any(|r| r == REG_INSTRUCTION_POINTER);
        let reads_other = record.registers_read().any(|r| {
            r != REG_STACK_POINTER && r != REG_FLAGS && r != REG_INSTRUCTION_POINTER
        });

        let kind = if !reads_sp && !reads_flags && writes_ip && !reads_other {
            Self::DirectJump
        } else if !reads_sp && !reads_flags && writes_ip && reads_other {
            Self::Indirect
        } else if !reads_sp && reads_ip && !writes_sp && writes_ip && reads_flags && !reads_other {
            Self::Conditional
        } else if reads_sp && reads_ip && writes_sp && writes_ip && !reads_flags && !reads_other {
            Self::DirectCall
        } else if reads_sp && reads_ip && writes_sp && writes_ip && !reads_flags && reads_other {
            Self::IndirectCall
        } else if reads_sp && !reads_ip && writes_sp && writes_ip {
            Self::Return
        } else if writes_ip {
            Self::Other
        } else {
            Self::NotBranch
        };

        if kind == Self::NotBranch && record.is_branch {
            Self::Other
        } else {
            kind
        }
    }
}
