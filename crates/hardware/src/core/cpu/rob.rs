//! Reorder buffer for the trace-driven core.
//!
//! Entries are dispatched in program order and retire in program order once
//! their instruction fetch and every load have returned and the execute
//! latency has elapsed.

use std::collections::VecDeque;

/// One in-flight instruction.
#[derive(Debug, Clone)]
pub struct RobEntry {
    /// Monotonic dispatch identifier; also the `instr_id` of its data requests.
    pub id: u64,
    /// Instruction address.
    pub ip: u64,
    /// Outstanding instruction fetch this entry waits on.
    pub fetch_token: Option<u64>,
    /// Loads still in flight.
    pub loads_pending: u32,
    /// Cycle at which execution completes, once scheduled.
    pub ready_at: Option<u64>,
}

impl RobEntry {
    const fn operands_ready(&self) -> bool {
        self.fetch_token.is_none() && self.loads_pending == 0
    }
}

/// Bounded in-order window of dispatched instructions.
#[derive(Debug, Clone)]
pub struct ReorderBuffer {
    entries: VecDeque<RobEntry>,
    capacity: usize,
    next_id: u64,
}

impl ReorderBuffer {
    /// Creates an empty buffer holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Entries in flight.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are in flight.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether another entry can be dispatched.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Identifier the next dispatched entry will receive.
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Appends an entry and returns its identifier.
    pub fn dispatch(&mut self, ip: u64, fetch_token: Option<u64>, loads_pending: u32) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_back(RobEntry {
            id,
            ip,
            fetch_token,
            loads_pending,
            ready_at: None,
        });
        id
    }

    /// Marks every entry waiting on `token` as fetched.
    pub fn fetch_returned(&mut self, token: u64) {
        for entry in &mut self.entries {
            if entry.fetch_token == Some(token) {
                entry.fetch_token = None;
            }
        }
    }

    /// Records one returned load for entry `id`.
    pub fn load_returned(&mut self, id: u64) {
        let Some(front) = self.entries.front().map(|e| e.id) else {
            return;
        };
        let Some(offset) = id.checked_sub(front) else {
            return;
        };
        if let Some(entry) = self.entries.get_mut(offset as usize) {
            entry.loads_pending = entry.loads_pending.saturating_sub(1);
        }
    }

    /// Schedules completion for entries whose operands have all arrived.
    pub fn schedule(&mut self, now: u64, latency: u64) {
        for entry in &mut self.entries {
            if entry.ready_at.is_none() && entry.operands_ready() {
                entry.ready_at = Some(now + latency);
            }
        }
    }

    /// Retires up to `width` completed entries from the head.
    ///
    /// # Returns
    ///
    /// The number of entries retired.
    pub fn retire(&mut self, now: u64, width: usize) -> usize {
        let mut retired = 0;
        while retired < width
            && self
                .entries
                .front()
                .is_some_and(|e| e.ready_at.is_some_and(|at| at <= now))
        {
            let _ = self.entries.pop_front();
            retired += 1;
        }
        retired
    }

    /// The oldest entry.
    pub fn head(&self) -> Option<&RobEntry> {
        self.entries.front()
    }
}
