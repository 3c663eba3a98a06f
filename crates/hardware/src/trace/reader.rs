//! Lazy trace reader.
//!
//! A `TraceReader` pulls fixed-size records from any byte source on demand. It keeps one
//! record of lookahead so that:
//! 1. **End of stream** is known before the consumer asks for the next instruction.
//! 2. **Branch targets** can be resolved as the ip of the following record.
//!
//! Readers opened from a file can optionally repeat: reaching the end reopens the file
//! and continues from its first record, so a bounded phase never starves.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::instruction::Instruction;
use super::record::{InstructionRecord, TraceFormat};
use crate::common::error::TraceError;

/// Outcome of trying to read one whole record.
enum Fill {
    Complete,
    Empty,
    Partial(usize),
}

/// Produces the instructions of one trace in file order.
pub struct TraceReader {
    name: String,
    format: TraceFormat,
    source: Box<dyn Read>,
    path: Option<PathBuf>,
    repeat: bool,
    buf: Vec<u8>,
    lookahead: Option<InstructionRecord>,
    records_read: u64,
    read_since_open: u64,
    rewinds: u64,
}

impl fmt::Debug for TraceReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceReader")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("repeat", &self.repeat)
            .field("records_read", &self.records_read)
            .field("eof", &self.eof())
            .finish_non_exhaustive()
    }
}

impl TraceReader {
    fn with_source(
        name: String,
        format: TraceFormat,
        source: Box<dyn Read>,
        path: Option<PathBuf>,
        repeat: bool,
    ) -> Result<Self, TraceError> {
        let mut reader = Self {
            name,
            format,
            source,
            path,
            repeat,
            buf: vec![0; format.record_size()],
            lookahead: None,
            records_read: 0,
            read_since_open: 0,
            rewinds: 0,
        };
        reader.lookahead = reader.read_record()?;
        Ok(reader)
    }

    /// Opens an on-disk trace.
    ///
    /// # Arguments
    ///
    /// * `path` - Trace file.
    /// * `format` - Record layout of the file.
    /// * `repeat` - Reopen the file at its end instead of reporting end of stream.
    pub fn open(path: impl AsRef<Path>, format: TraceFormat, repeat: bool) -> Result<Self, TraceError> {
        let path = path.as_ref().to_path_buf();
        let file = open_file(&path)?;
        Self::with_source(
            path.display().to_string(),
            format,
            Box::new(BufReader::new(file)),
            Some(path),
            repeat,
        )
    }

    /// Wraps an arbitrary byte source. The reader never repeats.
    pub fn from_reader(
        name: impl Into<String>,
        format: TraceFormat,
        source: impl Read + 'static,
    ) -> Result<Self, TraceError> {
        Self::with_source(name.into(), format, Box::new(source), None, false)
    }

    /// Builds an in-memory trace from already decoded records.
    pub fn from_records(
        name: impl Into<String>,
        format: TraceFormat,
        records: &[InstructionRecord],
    ) -> Result<Self, TraceError> {
        let bytes: Vec<u8> = records.iter().flat_map(|r| r.encode(format)).collect();
        Self::from_reader(name, format, Cursor::new(bytes))
    }

    /// Display name (the path for on-disk traces).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record layout being read.
    pub const fn format(&self) -> TraceFormat {
        self.format
    }

    /// Returns `true` once no instruction remains.
    pub const fn eof(&self) -> bool {
        self.lookahead.is_none()
    }

    /// Number of records decoded so far, including the lookahead record.
    pub const fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Number of times a repeating reader wrapped back to the start of its file.
    pub const fn rewinds(&self) -> u64 {
        self.rewinds
    }

    /// Returns the next instruction, or `None` at end of stream.
    pub fn next_instruction(&mut self) -> Result<Option<Instruction>, TraceError> {
        let Some(current) = self.lookahead.take() else {
            return Ok(None);
        };
        self.lookahead = self.read_record()?;
        let next_ip = self.lookahead.map_or(0, |r| r.ip);
        Ok(Some(Instruction::new(current, next_ip)))
    }

    fn read_record(&mut self) -> Result<Option<InstructionRecord>, TraceError> {
        loop {
            match self.fill_buffer()? {
                Fill::Complete => {
                    self.records_read += 1;
                    self.read_since_open += 1;
                    return Ok(InstructionRecord::decode(self.format, &self.buf));
                }
                Fill::Partial(len) => {
                    warn!(
                        trace = %self.name,
                        bytes = len,
                        record_size = self.format.record_size(),
                        "ignoring truncated trailing record"
                    );
                }
                Fill::Empty => {}
            }

            if !self.rewind()? {
                return Ok(None);
            }
        }
    }

    /// Reopens a repeating on-disk trace. Returns `false` when the stream really ended.
    fn rewind(&mut self) -> Result<bool, TraceError> {
        if !self.repeat || self.read_since_open == 0 {
            return Ok(false);
        }
        let Some(path) = self.path.as_ref() else {
            return Ok(false);
        };

        let file = open_file(path)?;
        self.source = Box::new(BufReader::new(file));
        self.read_since_open = 0;
        self.rewinds += 1;
        debug!(trace = %self.name, rewinds = self.rewinds, "trace reached its end, rewinding");
        Ok(true)
    }

    fn fill_buffer(&mut self) -> Result<Fill, TraceError> {
        let mut filled = 0;
        while filled < self.buf.len() {
            match self.source.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(TraceError::Read {
                        name: self.name.clone(),
                        source,
                    });
                }
            }
        }

        Ok(match filled {
            0 => Fill::Empty,
            n if n == self.buf.len() => Fill::Complete,
            n => Fill::Partial(n),
        })
    }
}

impl Iterator for TraceReader {
    type Item = Result<Instruction, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_instruction().transpose()
    }
}

fn open_file(path: &Path) -> Result<File, TraceError> {
    File::open(path).map_err(|source| TraceError::Open {
        path: path.to_path_buf(),
        source,
    })
}
