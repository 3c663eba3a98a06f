//! Trace Reader Tests.
//!
//! Lookahead and end-of-stream, on-disk layouts, repetition, and the error paths.

use std::io::{self, Cursor, Read, Write};
use std::num::NonZeroU64;

use pretty_assertions::assert_eq;
use tracesim_core::trace::{InstructionRecord, ProgramState, TraceFormat, TraceReader};
use tracesim_core::TraceError;

use crate::common::builder::{self, RecordBuilder};
use crate::common::harness;

// ──────────────────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────────────────

/// Fails every read.
struct BrokenSource;

impl Read for BrokenSource {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("device gone"))
    }
}

/// Interrupts the first read, then serves `inner`.
struct InterruptOnce {
    interrupted: bool,
    inner: Cursor<Vec<u8>>,
}

impl Read for InterruptOnce {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.interrupted {
            self.interrupted = true;
            return Err(io::ErrorKind::Interrupted.into());
        }
        self.inner.read(buf)
    }
}

fn open(file: &tempfile::NamedTempFile, format: TraceFormat, repeat: bool) -> TraceReader {
    TraceReader::open(file.path(), format, repeat).unwrap()
}

// ══════════════════════════════════════════════════════════
// 1. Lookahead
// ══════════════════════════════════════════════════════════

#[test]
fn lookahead_is_read_on_open() {
    let reader = harness::trace("main", &builder::straight_line(0x1000, 3));
    assert!(!reader.eof());
    assert_eq!(reader.records_read(), 1);
    assert_eq!(reader.name(), "main");
    assert_eq!(reader.format(), TraceFormat::Standard);
}

#[test]
fn empty_trace_is_immediately_at_end() {
    let mut reader = harness::trace("empty", &[]);
    assert!(reader.eof());
    assert!(reader.next_instruction().unwrap().is_none());
}

#[test]
fn eof_is_known_before_the_last_instruction_is_taken() {
    let mut reader = harness::trace("main", &builder::straight_line(0x1000, 2));
    let _ = reader.next_instruction().unwrap();
    assert!(!reader.eof());
    let last = reader.next_instruction().unwrap();
    assert!(last.is_some());
    assert!(reader.eof());
}

#[test]
fn targets_come_from_the_following_record() {
    let records = [
        builder::direct_jump(0x1000),
        builder::conditional(0x5000, false),
        builder::alu(0x5004),
    ];
    let reader = harness::trace("main", &records);
    let targets: Vec<u64> = reader.map(|instr| instr.unwrap().branch_target).collect();
    assert_eq!(targets, vec![0x5000, 0x5004, 0]);
}

// ══════════════════════════════════════════════════════════
// 2. On-disk layouts
// ══════════════════════════════════════════════════════════

#[test]
fn standard_file_reads_in_order() {
    let file = harness::trace_file(&builder::straight_line(0x1000, 5), TraceFormat::Standard);
    let mut reader = open(&file, TraceFormat::Standard, false);
    assert_eq!(harness::drain_ips(&mut reader), vec![0x1000, 0x1004, 0x1008, 0x100c, 0x1010]);
    assert_eq!(reader.rewinds(), 0);
}

#[test]
fn standard_layout_keeps_two_destinations() {
    let wide = RecordBuilder::new(0x1000)
        .store(0x10)
        .store(0x20)
        .store(0x30)
        .build();
    let file = harness::trace_file(&[wide], TraceFormat::Standard);
    let instr = open(&file, TraceFormat::Standard, false)
        .next_instruction()
        .unwrap()
        .unwrap();

    assert_eq!(instr.record.memory_writes().collect::<Vec<_>>(), vec![0x10, 0x20]);
    assert_eq!(instr.record.asid, None);
    assert_eq!(instr.record.program_state, None);
}

#[test]
fn cloudsuite_layout_carries_four_destinations_and_asid() {
    let mut record = RecordBuilder::new(0x2000)
        .store(0x10)
        .store(0x20)
        .store(0x30)
        .store(0x40)
        .load(0x80)
        .build();
    record.asid = Some([3, 4]);
    let file = harness::trace_file(&[record], TraceFormat::Cloudsuite);
    let instr = open(&file, TraceFormat::Cloudsuite, false)
        .next_instruction()
        .unwrap()
        .unwrap();

    assert_eq!(instr.record, record);
    assert_eq!(instr.record.memory_writes().count(), 4);
    assert_eq!(instr.record.source_memory[0], NonZeroU64::new(0x80));
}

#[test]
fn interpreter_layout_carries_program_state() {
    let mut jit = builder::alu(0x3000);
    jit.program_state = Some(ProgramState::Jit);
    let plain = builder::alu(0x3004);
    let file = harness::trace_file(&[jit, plain], TraceFormat::Interpreter);

    let states: Vec<Option<ProgramState>> = open(&file, TraceFormat::Interpreter, false)
        .map(|instr| instr.unwrap().record.program_state)
        .collect();
    assert_eq!(
        states,
        vec![Some(ProgramState::Jit), Some(ProgramState::Irrelevant)]
    );
}

#[test]
fn truncated_trailing_record_is_ignored() {
    let file = harness::trace_file(&builder::straight_line(0x1000, 2), TraceFormat::Standard);
    file.as_file().write_all(&[0xab; 10]).unwrap();

    let mut reader = open(&file, TraceFormat::Standard, false);
    assert_eq!(harness::drain_ips(&mut reader), vec![0x1000, 0x1004]);
    assert_eq!(reader.records_read(), 2);
}

// ══════════════════════════════════════════════════════════
// 3. Repetition
// ══════════════════════════════════════════════════════════

#[test]
fn repeating_trace_wraps_to_the_start() {
    let file = harness::trace_file(&builder::straight_line(0x1000, 3), TraceFormat::Standard);
    let reader = open(&file, TraceFormat::Standard, true);

    let ips: Vec<u64> = reader.take(7).map(|instr| instr.unwrap().ip()).collect();
    assert_eq!(ips, vec![0x1000, 0x1004, 0x1008, 0x1000, 0x1004, 0x1008, 0x1000]);
}

#[test]
fn wrap_resolves_target_to_the_first_record() {
    let file = harness::trace_file(&builder::straight_line(0x1000, 2), TraceFormat::Standard);
    let mut reader = open(&file, TraceFormat::Standard, true);

    let _ = reader.next_instruction().unwrap();
    let second = reader.next_instruction().unwrap().unwrap();
    assert_eq!(second.branch_target, 0x1000);
    assert_eq!(reader.rewinds(), 1);
    assert!(!reader.eof());
}

#[test]
fn repeating_empty_file_still_ends() {
    let file = harness::trace_file(&[], TraceFormat::Standard);
    let reader = open(&file, TraceFormat::Standard, true);
    assert!(reader.eof());
    assert_eq!(reader.rewinds(), 0);
}

#[test]
fn repeat_skips_truncated_tail() {
    let file = harness::trace_file(&builder::straight_line(0x1000, 2), TraceFormat::Standard);
    file.as_file().write_all(&[0xcd; 7]).unwrap();

    let reader = open(&file, TraceFormat::Standard, true);
    let ips: Vec<u64> = reader.take(5).map(|instr| instr.unwrap().ip()).collect();
    assert_eq!(ips, vec![0x1000, 0x1004, 0x1000, 0x1004, 0x1000]);
}

#[test]
fn in_memory_trace_never_repeats() {
    let mut reader = harness::trace("main", &builder::straight_line(0x1000, 2));
    assert_eq!(harness::drain_ips(&mut reader).len(), 2);
    assert!(reader.eof());
    assert_eq!(reader.rewinds(), 0);
}

// ══════════════════════════════════════════════════════════
// 4. Errors
// ══════════════════════════════════════════════════════════

#[test]
fn missing_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.trace");

    let err = TraceReader::open(&path, TraceFormat::Standard, false).unwrap_err();
    match err {
        TraceError::Open { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected Open, got {other:?}"),
    }
}

#[test]
fn read_failure_names_the_trace() {
    let err = TraceReader::from_reader("flaky", TraceFormat::Standard, BrokenSource).unwrap_err();
    assert!(matches!(err, TraceError::Read { ref name, .. } if name == "flaky"));
    assert!(err.to_string().contains("flaky"));
}

#[test]
fn interrupted_read_is_retried() {
    let bytes: Vec<u8> = builder::straight_line(0x1000, 2)
        .iter()
        .flat_map(|r| r.encode(TraceFormat::Standard))
        .collect();
    let source = InterruptOnce {
        interrupted: false,
        inner: Cursor::new(bytes),
    };
    let mut reader = TraceReader::from_reader("retry", TraceFormat::Standard, source).unwrap();
    assert_eq!(harness::drain_ips(&mut reader), vec![0x1000, 0x1004]);
}

#[test]
fn records_round_trip_through_every_layout() {
    let record: InstructionRecord = builder::conditional(0x4000, true);
    for format in [TraceFormat::Standard, TraceFormat::Cloudsuite, TraceFormat::Interpreter] {
        let bytes = record.encode(format);
        assert_eq!(bytes.len(), format.record_size());
        let decoded = InstructionRecord::decode(format, &bytes).unwrap();
        assert_eq!((decoded.ip, decoded.is_branch, decoded.branch_taken), (0x4000, true, true));
        assert_eq!(
            decoded.registers_read().collect::<Vec<_>>(),
            record.registers_read().collect::<Vec<_>>()
        );
    }
}
