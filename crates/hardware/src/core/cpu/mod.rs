//! Trace-driven core.
//!
//! The `Cpu` consumes decoded trace instructions from its input queue. Each cycle it:
//! 1. **Retires** completed instructions in order, up to the retire width.
//! 2. **Collects** responses from its instruction and data caches.
//! 3. **Schedules** instructions whose fetch and loads have returned.
//! 4. **Dispatches** new instructions into the reorder buffer, issuing one
//!    instruction fetch per new block, one load per source memory operand, and
//!    one write per destination memory operand.
//!
//! Branches are predicted and trained at dispatch. A misprediction stops dispatch
//! for a fixed penalty. Taken branches are forwarded to the instruction cache so a
//! fetch-directed prefetcher can follow their targets.

/// Reorder buffer.
pub mod rob;

use std::collections::VecDeque;

use self::rob::ReorderBuffer;
use crate::common::addr::block_address;
use crate::common::constants::BLOCK_SIZE;
use crate::common::data::AccessType;
use crate::common::error::ConfigError;
use crate::config::CoreConfig;
use crate::core::units::bru::{BranchPredictor, BranchPredictorWrapper};
use crate::core::units::prefetch::BranchEvent;
use crate::sim::environment::CoreModel;
use crate::sim::operable::{Clock, Operable};
use crate::soc::channel::{ChannelHandle, Request};
use crate::stats::CoreStats;
use crate::trace::Instruction;

/// Block fetch most recently requested from the instruction cache.
#[derive(Debug, Clone, Copy)]
struct FetchedBlock {
    block: u64,
    token: u64,
    returned: bool,
}

/// A trace-driven out-of-order core model.
#[derive(Debug)]
pub struct Cpu {
    cpu: usize,
    name: String,
    clock: Clock,
    warmup: bool,

    input_queue: VecDeque<Instruction>,
    in_queue_size: usize,
    rob: ReorderBuffer,
    fetch_width: usize,
    retire_width: usize,
    execute_latency: u64,
    mispredict_penalty: u64,
    /// Dispatch is blocked until this cycle after a misprediction.
    fetch_resume_at: u64,
    last_fetch: Option<FetchedBlock>,

    branch_predictor: BranchPredictorWrapper,
    l1i: ChannelHandle,
    l1d: ChannelHandle,

    num_retired: u64,
    sim_stats: CoreStats,
    roi_stats: CoreStats,
}

impl Cpu {
    /// Creates core `cpu` connected to its instruction and data caches.
    ///
    /// # Arguments
    ///
    /// * `cpu` - Core index.
    /// * `config` - Widths, queue sizes, latencies, and predictor selection.
    /// * `l1i` - Channel to the instruction cache.
    /// * `l1d` - Channel to the data cache.
    pub fn new(
        cpu: usize,
        config: &CoreConfig,
        l1i: ChannelHandle,
        l1d: ChannelHandle,
    ) -> Result<Self, ConfigError> {
        let name = format!("cpu{cpu}");
        Ok(Self {
            cpu,
            clock: Clock::new(config.clock_scale),
            warmup: false,
            input_queue: VecDeque::with_capacity(config.in_queue_size),
            in_queue_size: config.in_queue_size,
            rob: ReorderBuffer::new(config.rob_size),
            fetch_width: config.fetch_width,
            retire_width: config.retire_width,
            execute_latency: config.execute_latency,
            mispredict_penalty: config.mispredict_penalty,
            fetch_resume_at: 0,
            last_fetch: None,
            branch_predictor: BranchPredictorWrapper::new(config)?,
            l1i,
            l1d,
            num_retired: 0,
            sim_stats: CoreStats::new(name.as_str()),
            roi_stats: CoreStats::new(name.as_str()),
            name,
        })
    }

    /// Instructions waiting in the input queue.
    pub fn input_queue_len(&self) -> usize {
        self.input_queue.len()
    }

    /// Instructions dispatched but not yet retired.
    pub fn rob_occupancy(&self) -> usize {
        self.rob.len()
    }

    fn request(&self, address: u64, ip: u64, kind: AccessType, instr_id: u64) -> Request {
        Request {
            address,
            ip,
            kind,
            instr_id,
            cpu: self.cpu,
            metadata: 0,
        }
    }

    fn collect_responses(&mut self) -> u64 {
        let mut progress = 0;
        loop {
            let Some(response) = self.l1i.borrow_mut().pop_response() else {
                break;
            };
            self.rob.fetch_returned(response.instr_id);
            if let Some(fetch) = self.last_fetch.as_mut() {
                if fetch.token == response.instr_id {
                    fetch.returned = true;
                }
            }
            progress += 1;
        }
        loop {
            let Some(response) = self.l1d.borrow_mut().pop_response() else {
                break;
            };
            self.rob.load_returned(response.instr_id);
            progress += 1;
        }
        progress
    }

    /// Whether the caches can take every request `instr` needs right now.
    fn has_room_for(&self, instr: &Instruction, needs_fetch: bool) -> bool {
        let loads = instr.record.memory_reads().count();
        let writes = instr.record.memory_writes().count();
        let l1d = self.l1d.borrow();
        (!needs_fetch || self.l1i.borrow().free_slots(AccessType::Load) > 0)
            && l1d.free_slots(AccessType::Load) >= loads
            && l1d.free_slots(AccessType::Write) >= writes
    }

    fn dispatch(&mut self, now: u64) -> u64 {
        if now < self.fetch_resume_at {
            return 0;
        }

        let mut dispatched = 0;
        while dispatched < self.fetch_width && !self.rob.is_full() {
            let Some(instr) = self.input_queue.front() else {
                break;
            };
            let block = block_address(instr.ip());
            let needs_fetch = self.last_fetch.is_none_or(|fetch| fetch.block != block);
            if !self.has_room_for(instr, needs_fetch) {
                break;
            }
            let Some(instr) = self.input_queue.pop_front() else {
                break;
            };

            let id = self.rob.next_id();
            let fetch_token = if needs_fetch {
                let request = self.request(block, instr.ip(), AccessType::Load, id);
                let _ = self.l1i.borrow_mut().send(request);
                self.last_fetch = Some(FetchedBlock {
                    block,
                    token: id,
                    returned: false,
                });
                Some(id)
            } else {
                self.last_fetch
                    .filter(|fetch| !fetch.returned)
                    .map(|fetch| fetch.token)
            };

            let mut loads = 0;
            for address in instr.record.memory_reads() {
                let request = self.request(address, instr.ip(), AccessType::Load, id);
                let _ = self.l1d.borrow_mut().send(request);
                loads += 1;
            }
            for address in instr.record.memory_writes() {
                let request = self.request(address, instr.ip(), AccessType::Write, id);
                let _ = self.l1d.borrow_mut().send(request);
            }
            let _ = self.rob.dispatch(instr.ip(), fetch_token, loads);
            dispatched += 1;

            if instr.is_branch() && self.resolve_branch(&instr, now) {
                break;
            }
        }
        dispatched as u64
    }

    /// Predicts, trains, and records a branch.
    ///
    /// # Returns
    ///
    /// `true` if the branch was mispredicted.
    fn resolve_branch(&mut self, instr: &Instruction, now: u64) -> bool {
        let ip = instr.ip();
        let kind = instr.branch;
        let predicted = kind.is_unconditional() || self.branch_predictor.predict(ip);
        self.branch_predictor
            .update(ip, instr.branch_taken, predicted, instr.branch_target, kind);

        // A fall-through has no target; the next ip is just the following block.
        if instr.branch_taken {
            self.l1i.borrow_mut().notify_branch(BranchEvent {
                ip,
                kind,
                target: instr.branch_target,
                size: BLOCK_SIZE as u8,
            });
        }

        self.sim_stats.branch_type_counts[kind.index()] += 1;
        if predicted == instr.branch_taken {
            return false;
        }
        self.sim_stats.branch_type_misses[kind.index()] += 1;
        self.sim_stats.total_rob_occupancy_at_mispredict += self.rob.len() as u64;
        self.fetch_resume_at = now + self.mispredict_penalty;
        true
    }
}

impl Operable for Cpu {
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
        let now = self.clock.current_cycle();

        let retired = self.rob.retire(now, self.retire_width);
        self.num_retired += retired as u64;

        let mut progress = retired as u64 + self.collect_responses();
        self.rob.schedule(now, self.execute_latency);
        progress += self.dispatch(now);

        self.sim_stats.end_instrs = self.num_retired;
        self.sim_stats.end_cycles = now;
        progress
    }

    fn warmup(&self) -> bool {
        self.warmup
    }

    fn set_warmup(&mut self, warmup: bool) {
        self.warmup = warmup;
    }

    fn initialize(&mut self) {
        self.branch_predictor.initialize();
    }

    fn begin_phase(&mut self) {
        let now = self.clock.current_cycle();
        self.sim_stats = CoreStats {
            begin_instrs: self.num_retired,
            begin_cycles: now,
            end_instrs: self.num_retired,
            end_cycles: now,
            ..CoreStats::new(self.name.as_str())
        };
        self.roi_stats = self.sim_stats.clone();
    }

    fn end_phase(&mut self, cpu: usize) {
        if cpu == self.cpu {
            self.sim_stats.end_instrs = self.num_retired;
            self.sim_stats.end_cycles = self.clock.current_cycle();
            self.roi_stats = self.sim_stats.clone();
        }
    }

    fn deadlock_state(&self) -> String {
        let head = self.rob.head().map_or_else(
            || "empty".to_string(),
            |entry| {
                format!(
                    "id {} ip {:#x} fetch {:?} loads {} ready {:?}",
                    entry.id, entry.ip, entry.fetch_token, entry.loads_pending, entry.ready_at
                )
            },
        );
        format!(
            "{}: cycle {} retired {} input queue {}/{} rob {} (head {head}) resume at {}",
            self.name,
            self.clock.current_cycle(),
            self.num_retired,
            self.input_queue.len(),
            self.in_queue_size,
            self.rob.len(),
            self.fetch_resume_at,
        )
    }
}

impl CoreModel for Cpu {
    fn cpu(&self) -> usize {
        self.cpu
    }

    fn input_capacity(&self) -> usize {
        self.in_queue_size.saturating_sub(self.input_queue.len())
    }

    fn push_instruction(&mut self, instr: Instruction) {
        self.input_queue.push_back(instr);
    }

    fn retired(&self) -> u64 {
        self.num_retired
    }

    fn current_cycle(&self) -> u64 {
        self.clock.current_cycle()
    }

    fn sim_stats(&self) -> &CoreStats {
        &self.sim_stats
    }

    fn roi_stats(&self) -> &CoreStats {
        &self.roi_stats
    }
}
