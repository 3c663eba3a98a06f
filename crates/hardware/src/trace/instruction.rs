//! Instructions as delivered to a core's input queue.

use super::branch::BranchKind;
use super::record::InstructionRecord;

/// A trace record enriched with what the reader knows from its position in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The raw record.
    pub record: InstructionRecord,
    /// Inferred control-transfer kind.
    pub branch: BranchKind,
    /// Resolved direction; unconditional kinds are always taken.
    pub branch_taken: bool,
    /// Instruction pointer of the following record (0 at the end of the trace).
    pub branch_target: u64,
}

impl Instruction {
    /// Builds an instruction from its record and the ip of the record that follows it.
    pub fn new(record: InstructionRecord, next_ip: u64) -> Self {
        let branch = BranchKind::classify(&record);
        let branch_taken =
            branch.is_unconditional() || (branch.is_branch() && record.branch_taken);
        Self {
            record,
            branch,
            branch_taken,
            branch_target: next_ip,
        }
    }

    /// Instruction pointer.
    #[inline(always)]
    pub const fn ip(&self) -> u64 {
        self.record.ip
    }

    /// Returns `true` if this instruction is any kind of branch.
    #[inline(always)]
    pub const fn is_branch(&self) -> bool {
        self.branch.is_branch()
    }
}
