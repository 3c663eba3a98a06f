//! Set-Associative Cache.
//!
//! This module implements the timed cache component. It provides:
//! 1. **Tag array:** Configurable sets and ways with LRU or FIFO replacement.
//! 2. **Outstanding misses:** An MSHR that merges misses to the same block and
//!    bounds how many fills can be in flight.
//! 3. **Prefetching:** An internal prefetch queue fed by the attached prefetcher
//!    through [`PrefetchContext`].
//! 4. **Timing:** A hit latency, a limit on tag lookups per cycle, and queues to
//!    the levels above and below.
//!
//! Writes allocate on miss without fetching and are written back when a dirty
//! block is evicted; they never produce a response.

/// Cache replacement policy implementations (FIFO, LRU).
pub mod policies;

use std::collections::VecDeque;
use std::fmt::Write as _;

use self::policies::ReplacementPolicy;
use crate::common::addr::{block_address, block_number};
use crate::common::data::AccessType;
use crate::config::{CacheConfig, Prefetcher as PrefetcherType};
use crate::core::units::prefetch::{
    CacheAccess, CacheFill, FdipPrefetcher, NextLinePrefetcher, PrefetchContext, Prefetcher,
    StridePrefetcher,
};
use crate::sim::operable::{Clock, Operable};
use crate::soc::channel::{ChannelHandle, Request, Response};
use crate::stats::CacheStats;

/// Cache block state.
#[derive(Debug, Clone, Copy, Default)]
struct Block {
    valid: bool,
    dirty: bool,
    /// Brought in by a prefetch and not yet hit by a demand access.
    prefetched: bool,
    address: u64,
}

/// Where a waiting request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Internal,
    Upper(usize),
}

/// An outstanding miss.
#[derive(Debug, Clone)]
struct MshrEntry {
    block: u64,
    kind: AccessType,
    issued_at: u64,
    metadata: u32,
    /// Upper-level requests to answer when the fill arrives.
    waiters: Vec<(usize, Request)>,
}

/// A prefetch queued by this cache's own prefetcher.
#[derive(Debug, Clone, Copy)]
struct QueuedPrefetch {
    request: Request,
    fill_this_level: bool,
}

/// Tag array, MSHR, and statistics; the part of a cache its prefetcher may touch.
#[derive(Debug)]
pub struct CacheState {
    sets: usize,
    ways: usize,
    blocks: Vec<Block>,
    policy: Box<dyn ReplacementPolicy>,
    mshr: Vec<MshrEntry>,
    mshr_size: usize,
    pq: VecDeque<QueuedPrefetch>,
    pq_size: usize,
    cycle: u64,
    sim_stats: CacheStats,
}

impl CacheState {
    fn new(name: &str, config: &CacheConfig) -> Self {
        let sets = config.sets.max(1).next_power_of_two();
        let ways = config.ways.max(1);
        Self {
            sets,
            ways,
            blocks: vec![Block::default(); sets * ways],
            policy: policies::build(config.policy, sets, ways),
            mshr: Vec::with_capacity(config.mshr_size),
            mshr_size: config.mshr_size,
            pq: VecDeque::with_capacity(config.pq_size),
            pq_size: config.pq_size,
            cycle: 0,
            sim_stats: CacheStats::new(name),
        }
    }

    fn set_of(&self, block: u64) -> usize {
        (block_number(block) as usize) & (self.sets - 1)
    }

    /// Returns `(set, way)` of the resident block containing `addr`.
    fn lookup(&self, addr: u64) -> Option<(usize, usize)> {
        let block = block_address(addr);
        let set = self.set_of(block);
        let base = set * self.ways;
        self.blocks[base..base + self.ways]
            .iter()
            .position(|b| b.valid && b.address == block)
            .map(|way| (set, way))
    }

    fn block_mut(&mut self, set: usize, way: usize) -> &mut Block {
        &mut self.blocks[set * self.ways + way]
    }

    /// Installs `block`, returning `(set, way, evicted block)`.
    fn fill(&mut self, block: u64, prefetch: bool, dirty: bool) -> (usize, usize, Option<Block>) {
        let set = self.set_of(block);
        let base = set * self.ways;
        let way = self.blocks[base..base + self.ways]
            .iter()
            .position(|b| !b.valid)
            .unwrap_or_else(|| self.policy.victim(set));

        let slot = self.block_mut(set, way);
        let evicted = slot.valid.then_some(*slot);
        *slot = Block {
            valid: true,
            dirty,
            prefetched: prefetch,
            address: block,
        };
        self.policy.on_fill(set, way);

        if evicted.is_some_and(|b| b.prefetched) {
            self.sim_stats.pf_useless += 1;
        }
        if prefetch {
            self.sim_stats.pf_fill += 1;
        }
        (set, way, evicted)
    }

    fn mshr_position(&self, block: u64) -> Option<usize> {
        self.mshr.iter().position(|entry| entry.block == block)
    }
}

impl PrefetchContext for CacheState {
    fn outstanding_miss_occupancy(&self) -> usize {
        self.mshr.len()
    }

    fn outstanding_miss_capacity(&self) -> usize {
        self.mshr_size
    }

    fn issue_prefetch(&mut self, addr: u64, fill_this_level: bool, metadata: u32) -> bool {
        self.sim_stats.pf_requested += 1;
        if self.pq.len() >= self.pq_size {
            return false;
        }
        self.pq.push_back(QueuedPrefetch {
            request: Request {
                address: block_address(addr),
                ip: 0,
                kind: AccessType::Prefetch,
                instr_id: 0,
                cpu: 0,
                metadata,
            },
            fill_this_level,
        });
        self.sim_stats.pf_issued += 1;
        true
    }

    fn is_resident(&self, addr: u64) -> bool {
        self.lookup(addr).is_some()
    }
}

/// A response waiting out the hit latency.
#[derive(Debug, Clone, Copy)]
struct PendingHit {
    ready_at: u64,
    upper: usize,
    response: Response,
}

/// Result of one tag lookup attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Handled,
    Stalled,
}

/// A timed set-associative cache.
#[derive(Debug)]
pub struct Cache {
    name: String,
    clock: Clock,
    warmup: bool,
    hit_latency: u64,
    max_tag_check: usize,
    upper: Vec<ChannelHandle>,
    lower: ChannelHandle,
    state: CacheState,
    prefetcher: Option<Box<dyn Prefetcher>>,
    ready: VecDeque<PendingHit>,
    writebacks: VecDeque<Request>,
    roi_stats: CacheStats,
}

impl Cache {
    /// Creates a cache with the prefetcher selected by `config`.
    ///
    /// # Arguments
    ///
    /// * `name` - Component name, also used for its statistics.
    /// * `config` - Geometry, timing, policy, and prefetcher selection.
    /// * `upper` - Channels from the levels above, answered in this order.
    /// * `lower` - Channel to the level below.
    pub fn new(
        name: impl Into<String>,
        config: &CacheConfig,
        upper: Vec<ChannelHandle>,
        lower: ChannelHandle,
    ) -> Self {
        let prefetcher: Option<Box<dyn Prefetcher>> = match config.prefetcher {
            PrefetcherType::None => None,
            PrefetcherType::NextLine => Some(Box::new(NextLinePrefetcher::new(
                config.prefetch_degree,
            ))),
            PrefetcherType::Stride => Some(Box::new(StridePrefetcher::new(
                config.prefetch_table_size,
                config.prefetch_degree,
            ))),
            PrefetcherType::Fdip => Some(Box::new(FdipPrefetcher::new())),
        };
        Self::with_prefetcher(name, config, upper, lower, prefetcher)
    }

    /// Creates a cache with an explicit prefetcher.
    pub fn with_prefetcher(
        name: impl Into<String>,
        config: &CacheConfig,
        upper: Vec<ChannelHandle>,
        lower: ChannelHandle,
        prefetcher: Option<Box<dyn Prefetcher>>,
    ) -> Self {
        let name = name.into();
        Self {
            state: CacheState::new(&name, config),
            roi_stats: CacheStats::new(name.as_str()),
            name,
            clock: Clock::new(config.clock_scale),
            warmup: false,
            hit_latency: config.hit_latency,
            max_tag_check: config.max_tag_check.max(1),
            upper,
            lower,
            prefetcher,
            ready: VecDeque::new(),
            writebacks: VecDeque::new(),
        }
    }

    /// Counters accumulated since the phase began.
    pub const fn sim_stats(&self) -> &CacheStats {
        &self.state.sim_stats
    }

    /// Counters frozen when the core finished the phase.
    pub const fn roi_stats(&self) -> &CacheStats {
        &self.roi_stats
    }

    /// Whether the block containing `addr` is resident.
    pub fn contains(&self, addr: u64) -> bool {
        self.state.lookup(addr).is_some()
    }

    /// MSHR entries in use.
    pub fn mshr_occupancy(&self) -> usize {
        self.state.mshr.len()
    }

    /// The attached prefetcher, if any.
    pub fn prefetcher(&self) -> Option<&dyn Prefetcher> {
        self.prefetcher.as_deref()
    }

    /// Installs `addr` without timing, as if it had been filled long ago.
    pub fn warm(&mut self, addr: u64) {
        if !self.contains(addr) {
            let _ = self.state.fill(block_address(addr), false, false);
        }
    }

    fn notify_access(&mut self, request: &Request, hit: bool, useful_prefetch: bool) -> u32 {
        let access = CacheAccess {
            addr: request.address,
            ip: request.ip,
            hit,
            useful_prefetch,
            kind: request.kind,
            metadata: request.metadata,
        };
        match self.prefetcher.as_deref_mut() {
            Some(prefetcher) => prefetcher.cache_operate(&mut self.state, &access),
            None => request.metadata,
        }
    }

    fn handle_fills(&mut self) -> u64 {
        let mut progress = 0;
        loop {
            let Some(response) = self.lower.borrow_mut().pop_response() else {
                break;
            };
            progress += 1;

            let block = block_address(response.address);
            let Some(pos) = self.state.mshr_position(block) else {
                continue;
            };
            let entry = self.state.mshr.remove(pos);
            let prefetch = entry.kind == AccessType::Prefetch;
            let (set, way, evicted) = self.state.fill(block, prefetch, false);
            self.state.sim_stats.total_miss_latency +=
                self.state.cycle.saturating_sub(entry.issued_at);
            self.queue_writeback(evicted);

            if let Some(prefetcher) = self.prefetcher.as_deref_mut() {
                let fill = CacheFill {
                    addr: block,
                    set,
                    way,
                    prefetch,
                    evicted_addr: evicted.map(|b| b.address),
                    metadata: entry.metadata,
                };
                let _ = prefetcher.cache_fill(&mut self.state, &fill);
            }

            for (upper, request) in &entry.waiters {
                if let Some(channel) = self.upper.get(*upper) {
                    channel.borrow_mut().respond(Response::from(request));
                }
            }
        }
        progress
    }

    fn queue_writeback(&mut self, evicted: Option<Block>) {
        if let Some(victim) = evicted.filter(|b| b.dirty) {
            self.writebacks.push_back(Request {
                address: victim.address,
                ip: 0,
                kind: AccessType::Write,
                instr_id: 0,
                cpu: 0,
                metadata: 0,
            });
        }
    }

    fn deliver_hits(&mut self) -> u64 {
        let mut progress = 0;
        while self
            .ready
            .front()
            .is_some_and(|hit| hit.ready_at <= self.state.cycle)
        {
            let Some(hit) = self.ready.pop_front() else {
                break;
            };
            if let Some(channel) = self.upper.get(hit.upper) {
                channel.borrow_mut().respond(hit.response);
            }
            progress += 1;
        }
        progress
    }

    fn forward_branches(&mut self) {
        let Some(prefetcher) = self.prefetcher.as_deref_mut() else {
            return;
        };
        for channel in &self.upper {
            let events = channel.borrow_mut().take_branches();
            for event in &events {
                prefetcher.branch_operate(event);
            }
        }
    }

    fn peek(&self, source: Source) -> Option<(Request, bool)> {
        match source {
            Source::Internal => self
                .state
                .pq
                .front()
                .map(|pf| (pf.request, pf.fill_this_level)),
            Source::Upper(i) => self
                .upper
                .get(i)
                .and_then(|channel| channel.borrow().peek_request().copied())
                .map(|request| (request, true)),
        }
    }

    fn pop(&mut self, source: Source) {
        match source {
            Source::Internal => {
                let _ = self.state.pq.pop_front();
            }
            Source::Upper(i) => {
                if let Some(channel) = self.upper.get(i) {
                    let _ = channel.borrow_mut().pop_request();
                }
            }
        }
    }

    fn tag_checks(&mut self) -> u64 {
        let mut checks = 0;
        let sources =
            std::iter::once(Source::Internal).chain((0..self.upper.len()).map(Source::Upper));
        for source in sources {
            while checks < self.max_tag_check {
                let Some((request, fill_this_level)) = self.peek(source) else {
                    break;
                };
                if self.lookup(source, request, fill_this_level) == Lookup::Stalled {
                    break;
                }
                self.pop(source);
                checks += 1;
            }
        }
        checks as u64
    }

    fn lookup(&mut self, source: Source, request: Request, fill_this_level: bool) -> Lookup {
        let block = block_address(request.address);
        let kind = request.kind;

        if let Some((set, way)) = self.state.lookup(block) {
            self.state.sim_stats.record_hit(kind);
            self.state.policy.on_hit(set, way);
            let resident = self.state.block_mut(set, way);
            let useful = resident.prefetched && kind != AccessType::Prefetch;
            if useful {
                resident.prefetched = false;
            }
            if kind == AccessType::Write {
                resident.dirty = true;
            }
            if useful {
                self.state.sim_stats.pf_useful += 1;
            }

            if let Source::Upper(upper) = source {
                if kind != AccessType::Write {
                    self.ready.push_back(PendingHit {
                        ready_at: self.state.cycle + self.hit_latency,
                        upper,
                        response: Response::from(&request),
                    });
                }
                let _ = self.notify_access(&request, true, useful);
            }
            return Lookup::Handled;
        }

        if kind == AccessType::Write {
            self.state.sim_stats.record_miss(kind);
            let (_, _, evicted) = self.state.fill(block, false, true);
            self.queue_writeback(evicted);
            if matches!(source, Source::Upper(_)) {
                let _ = self.notify_access(&request, false, false);
            }
            return Lookup::Handled;
        }

        if !fill_this_level {
            let forwarded = self.lower.borrow_mut().send(request);
            if forwarded {
                self.state.sim_stats.record_miss(kind);
                return Lookup::Handled;
            }
            return Lookup::Stalled;
        }

        if let Some(pos) = self.state.mshr_position(block) {
            self.state.sim_stats.record_miss(kind);
            let entry = &mut self.state.mshr[pos];
            if entry.kind == AccessType::Prefetch && kind != AccessType::Prefetch {
                entry.kind = kind;
            }
            if let Source::Upper(upper) = source {
                entry.waiters.push((upper, request));
                let _ = self.notify_access(&request, false, false);
            }
            return Lookup::Handled;
        }

        let lower_has_room = self.lower.borrow().free_slots(kind) > 0;
        if self.state.mshr.len() >= self.state.mshr_size || !lower_has_room {
            return Lookup::Stalled;
        }

        self.state.sim_stats.record_miss(kind);
        let metadata = match source {
            Source::Upper(_) => self.notify_access(&request, false, false),
            Source::Internal => request.metadata,
        };
        let downstream = Request {
            address: block,
            metadata,
            ..request
        };
        let _ = self.lower.borrow_mut().send(downstream);
        self.state.mshr.push(MshrEntry {
            block,
            kind,
            issued_at: self.state.cycle,
            metadata,
            waiters: match source {
                Source::Upper(upper) => vec![(upper, request)],
                Source::Internal => Vec::new(),
            },
        });
        Lookup::Handled
    }

    fn flush_writebacks(&mut self) -> u64 {
        let mut progress = 0;
        while let Some(&request) = self.writebacks.front() {
            if !self.lower.borrow_mut().send(request) {
                break;
            }
            let _ = self.writebacks.pop_front();
            progress += 1;
        }
        progress
    }
}

impl Operable for Cache {
    fn name(&self) -> &str {
        &self.name
    }

    fn clock(&self) -> &Clock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    fn operate(&mut self) -> u64 {
        self.state.cycle = self.clock.current_cycle();

        let mut progress = self.handle_fills();
        progress += self.deliver_hits();
        self.forward_branches();
        progress += self.tag_checks();
        if let Some(prefetcher) = self.prefetcher.as_deref_mut() {
            prefetcher.cycle_operate(&mut self.state);
        }
        progress + self.flush_writebacks()
    }

    fn warmup(&self) -> bool {
        self.warmup
    }

    fn set_warmup(&mut self, warmup: bool) {
        self.warmup = warmup;
    }

    fn initialize(&mut self) {
        if let Some(prefetcher) = self.prefetcher.as_deref_mut() {
            prefetcher.initialize();
        }
    }

    fn begin_phase(&mut self) {
        self.state.sim_stats = CacheStats::new(self.name.as_str());
        self.roi_stats = CacheStats::new(self.name.as_str());
    }

    fn end_phase(&mut self, _cpu: usize) {
        self.roi_stats = self.state.sim_stats.clone();
    }

    fn deadlock_state(&self) -> String {
        let mut dump = format!(
            "{}: cycle {} mshr {}/{} pq {}/{} pending hits {} writebacks {}",
            self.name,
            self.clock.current_cycle(),
            self.state.mshr.len(),
            self.state.mshr_size,
            self.state.pq.len(),
            self.state.pq_size,
            self.ready.len(),
            self.writebacks.len(),
        );
        for entry in &self.state.mshr {
            let _ = write!(
                dump,
                "\n  mshr {:#x} {} issued at {} ({} waiting)",
                entry.block,
                entry.kind.label(),
                entry.issued_at,
                entry.waiters.len()
            );
        }
        if let Some(prefetcher) = self.prefetcher.as_deref() {
            let state = prefetcher.deadlock_state();
            if !state.is_empty() {
                let _ = write!(dump, "\n  {state}");
            }
        }
        dump
    }
}
