//! Fixed-layout instruction trace records.
//!
//! Traces are flat files of native (little-endian, C-padded) records, one per executed
//! instruction. Three layouts exist:
//!
//! | Format        | Size | Destinations | Extra field                    |
//! |---------------|------|--------------|--------------------------------|
//! | `Standard`    | 64 B | 2            | none                           |
//! | `Cloudsuite`  | 96 B | 4            | 2-byte address-space id pair   |
//! | `Interpreter` | 72 B | 2            | 4-byte interpreter/JIT state   |
//!
//! Register id 0 and memory address 0 mark an empty slot in the on-disk arrays. Decoded
//! records carry those slots as `None` so a real zero can never be mistaken for data.

use std::num::{NonZeroU8, NonZeroU64};

use serde::{Deserialize, Serialize};

/// Maximum number of register or memory slots any record format carries.
pub const MAX_SLOTS: usize = 4;

/// Destination slots in the standard and interpreter layouts.
pub const NUM_INSTR_DESTINATIONS: usize = 2;

/// Destination slots in the cloudsuite layout.
pub const NUM_INSTR_DESTINATIONS_SPARC: usize = 4;

/// Source slots in every layout.
pub const NUM_INSTR_SOURCES: usize = 4;

/// On-disk trace record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum TraceFormat {
    /// Base 64-byte record.
    #[default]
    Standard,
    /// 96-byte record with four destinations and an address-space id pair.
    #[serde(alias = "CloudSuite")]
    Cloudsuite,
    /// 72-byte record tagged with the interpreter execution state.
    #[serde(alias = "LuaJit", alias = "Luajit")]
    Interpreter,
}

/// Byte offsets of each field within one record layout.
struct Layout {
    size: usize,
    dst_regs: (usize, usize),
    src_regs: (usize, usize),
    dst_mem: (usize, usize),
    src_mem: (usize, usize),
    asid: Option<usize>,
    state: Option<usize>,
}

const IP_OFFSET: usize = 0;
const IS_BRANCH_OFFSET: usize = 8;
const TAKEN_OFFSET: usize = 9;

const STANDARD: Layout = Layout {
    size: 64,
    dst_regs: (10, NUM_INSTR_DESTINATIONS),
    src_regs: (12, NUM_INSTR_SOURCES),
    dst_mem: (16, NUM_INSTR_DESTINATIONS),
    src_mem: (32, NUM_INSTR_SOURCES),
    asid: None,
    state: None,
};

// Register arrays end at byte 18; the memory arrays are 8-byte aligned.
const CLOUDSUITE: Layout = Layout {
    size: 96,
    dst_regs: (10, NUM_INSTR_DESTINATIONS_SPARC),
    src_regs: (14, NUM_INSTR_SOURCES),
    dst_mem: (24, NUM_INSTR_DESTINATIONS_SPARC),
    src_mem: (56, NUM_INSTR_SOURCES),
    asid: Some(88),
    state: None,
};

const INTERPRETER: Layout = Layout {
    size: 72,
    dst_regs: (10, NUM_INSTR_DESTINATIONS),
    src_regs: (12, NUM_INSTR_SOURCES),
    dst_mem: (16, NUM_INSTR_DESTINATIONS),
    src_mem: (32, NUM_INSTR_SOURCES),
    asid: None,
    state: Some(64),
};

impl TraceFormat {
    const fn layout(self) -> &'static Layout {
        match self {
            Self::Standard => &STANDARD,
            Self::Cloudsuite => &CLOUDSUITE,
            Self::Interpreter => &INTERPRETER,
        }
    }

    /// Size of one on-disk record in bytes.
    pub const fn record_size(self) -> usize {
        self.layout().size
    }

    /// Number of destination register/memory slots this layout stores.
    pub const fn destination_slots(self) -> usize {
        self.layout().dst_regs.1
    }
}

/// Execution mode of the interpreter that produced an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProgramState {
    /// The tracer could not determine the state (also used for unknown raw values).
    Error,
    /// The instruction is not attributable to the interpreter.
    Irrelevant,
    /// Bytecode interpreter loop.
    Interpreting,
    /// JIT-compiled machine code.
    Jit,
    /// Trace recording.
    Tracing,
}

impl ProgramState {
    /// Decodes the 4-byte state tag.
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Irrelevant,
            1 => Self::Interpreting,
            2 => Self::Jit,
            3 => Self::Tracing,
            _ => Self::Error,
        }
    }

    /// Encodes the state tag.
    pub const fn to_raw(self) -> i32 {
        match self {
            Self::Error => -1,
            Self::Irrelevant => 0,
            Self::Interpreting => 1,
            Self::Jit => 2,
            Self::Tracing => 3,
        }
    }
}

/// One decoded trace record.
///
/// Slots past a format's capacity are always `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstructionRecord {
    /// Instruction pointer.
    pub ip: u64,
    /// Branch flag as written by the tracer.
    pub is_branch: bool,
    /// Taken flag as written by the tracer.
    pub branch_taken: bool,
    /// Registers written by the instruction.
    pub destination_registers: [Option<NonZeroU8>; MAX_SLOTS],
    /// Registers read by the instruction.
    pub source_registers: [Option<NonZeroU8>; MAX_SLOTS],
    /// Memory addresses written by the instruction.
    pub destination_memory: [Option<NonZeroU64>; MAX_SLOTS],
    /// Memory addresses read by the instruction.
    pub source_memory: [Option<NonZeroU64>; MAX_SLOTS],
    /// Address-space id pair (cloudsuite traces only).
    pub asid: Option<[u8; 2]>,
    /// Interpreter execution state (interpreter traces only).
    pub program_state: Option<ProgramState>,
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_le_bytes(raw)
}

fn decode_regs(bytes: &[u8], (offset, count): (usize, usize)) -> [Option<NonZeroU8>; MAX_SLOTS] {
    let mut slots = [None; MAX_SLOTS];
    for (i, slot) in slots.iter_mut().take(count).enumerate() {
        *slot = NonZeroU8::new(bytes[offset + i]);
    }
    slots
}

fn decode_mem(bytes: &[u8], (offset, count): (usize, usize)) -> [Option<NonZeroU64>; MAX_SLOTS] {
    let mut slots = [None; MAX_SLOTS];
    for (i, slot) in slots.iter_mut().take(count).enumerate() {
        *slot = NonZeroU64::new(read_u64(bytes, offset + 8 * i));
    }
    slots
}

fn encode_regs(out: &mut [u8], (offset, count): (usize, usize), slots: &[Option<NonZeroU8>]) {
    for (i, slot) in slots.iter().take(count).enumerate() {
        out[offset + i] = slot.map_or(0, NonZeroU8::get);
    }
}

fn encode_mem(out: &mut [u8], (offset, count): (usize, usize), slots: &[Option<NonZeroU64>]) {
    for (i, slot) in slots.iter().take(count).enumerate() {
        let at = offset + 8 * i;
        out[at..at + 8].copy_from_slice(&slot.map_or(0, NonZeroU64::get).to_le_bytes());
    }
}

impl InstructionRecord {
    /// Decodes one record.
    ///
    /// # Arguments
    ///
    /// * `format` - Layout of the record.
    /// * `bytes` - At least `format.record_size()` bytes; extra bytes are ignored.
    ///
    /// # Returns
    ///
    /// The decoded record, or `None` if `bytes` is too short.
    pub fn decode(format: TraceFormat, bytes: &[u8]) -> Option<Self> {
        let layout = format.layout();
        if bytes.len() < layout.size {
            return None;
        }

        Some(Self {
            ip: read_u64(bytes, IP_OFFSET),
            is_branch: bytes[IS_BRANCH_OFFSET] != 0,
            branch_taken: bytes[TAKEN_OFFSET] != 0,
            destination_registers: decode_regs(bytes, layout.dst_regs),
            source_registers: decode_regs(bytes, layout.src_regs),
            destination_memory: decode_mem(bytes, layout.dst_mem),
            source_memory: decode_mem(bytes, layout.src_mem),
            asid: layout.asid.map(|at| [bytes[at], bytes[at + 1]]),
            program_state: layout
                .state
                .map(|at| ProgramState::from_raw(read_i32(bytes, at))),
        })
    }

    /// Encodes the record into its exact on-disk bytes.
    ///
    /// Slots beyond the format's capacity are dropped; missing optional fields encode as zero.
    pub fn encode(&self, format: TraceFormat) -> Vec<u8> {
        let layout = format.layout();
        let mut out = vec![0u8; layout.size];

        out[IP_OFFSET..IP_OFFSET + 8].copy_from_slice(&self.ip.to_le_bytes());
        out[IS_BRANCH_OFFSET] = u8::from(self.is_branch);
        out[TAKEN_OFFSET] = u8::from(self.branch_taken);
        encode_regs(&mut out, layout.dst_regs, &self.destination_registers);
        encode_regs(&mut out, layout.src_regs, &self.source_registers);
        encode_mem(&mut out, layout.dst_mem, &self.destination_memory);
        encode_mem(&mut out, layout.src_mem, &self.source_memory);
        if let Some(at) = layout.asid {
            let asid = self.asid.unwrap_or([0, 0]);
            out[at] = asid[0];
            out[at + 1] = asid[1];
        }
        if let Some(at) = layout.state {
            let raw = self.program_state.map_or(0, ProgramState::to_raw);
            out[at..at + 4].copy_from_slice(&raw.to_le_bytes());
        }
        out
    }

    /// Registers written, skipping empty slots.
    pub fn registers_written(&self) -> impl Iterator<Item = u8> + '_ {
        self.destination_registers.iter().flatten().map(|r| r.get())
    }

    /// Registers read, skipping empty slots.
    pub fn registers_read(&self) -> impl Iterator<Item = u8> + '_ {
        self.source_registers.iter().flatten().map(|r| r.get())
    }

    /// Memory addresses written, skipping empty slots.
    pub fn memory_writes(&self) -> impl Iterator<Item = u64> + '_ {
        self.destination_memory.iter().flatten().map(|a| a.get())
    }

    /// Memory addresses read, skipping empty slots.
    pub fn memory_reads(&self) -> impl Iterator<Item = u64> + '_ {
        self.source_memory.iter().flatten().map(|a| a.get())
    }
}
