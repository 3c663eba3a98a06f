//! Row-buffer timing model for a DRAM channel.
//!
//! Each access is classified against the currently open row:
//! 1. **Row hit:** The row is open; only the column access (CAS) is paid.
//! 2. **Row empty:** No row is open; activation (RAS) plus CAS.
//! 3. **Row conflict:** Another row is open; precharge, activation, and CAS.

/// Outcome of one access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAccess {
    /// Latency in DRAM cycles.
    pub latency: u64,
    /// Whether the access found its row already open.
    pub row_hit: bool,
}

/// DRAM-style controller with row buffer; models CAS, RAS, and precharge latencies.
#[derive(Debug, Clone)]
pub struct DramController {
    last_row: Option<u64>,
    t_cas: u64,
    t_ras: u64,
    t_pre: u64,
    row_mask: u64,
}

impl DramController {
    /// Creates a DRAM controller with the given timing parameters (in DRAM cycles).
    ///
    /// # Arguments
    ///
    /// * `t_cas` - Column access strobe latency.
    /// * `t_ras` - Row access strobe latency.
    /// * `t_pre` - Precharge latency.
    /// * `row_bytes` - Row size; rounded up to a power of two.
    ///
    /// # Returns
    ///
    /// A new `DramController` with no row currently open.
    pub fn new(t_cas: u64, t_ras: u64, t_pre: u64, row_bytes: u64) -> Self {
        Self {
            last_row: None,
            t_cas,
            t_ras,
            t_pre,
            row_mask: !(row_bytes.max(1).next_power_of_two() - 1),
        }
    }

    /// Times an access to `addr` and leaves its row open.
    pub fn access(&mut self, addr: u64) -> RowAccess {
        let row = addr & self.row_mask;
        let (latency, row_hit) = match self.last_row {
            Some(open_row) if open_row == row => (self.t_cas, true),
            Some(_) => (self.t_pre + self.t_ras + self.t_cas, false),
            None => (self.t_ras + self.t_cas, false),
        };
        self.last_row = Some(row);
        RowAccess { latency, row_hit }
    }
}
