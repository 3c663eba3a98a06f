//! Main memory.
//!
//! This module implements the DRAM side of the hierarchy. It provides:
//! 1. **Controller:** Row-buffer latency modeling (CAS, RAS, precharge).
//! 2. **Channel:** A timed [`DramChannel`] that serves one request at a time from
//!    the last-level cache's lower queue.

/// Memory controller row-buffer timing.
pub mod controller;

use self::controller::DramController;
use crate::common::data::AccessType;
use crate::config::DramConfig;
use crate::sim::operable::{Clock, Operable};
use crate::soc::channel::{ChannelHandle, Request, Response};
use crate::stats::DramStats;

/// A single DRAM channel.
#[derive(Debug)]
pub struct DramChannel {
    name: String,
    clock: Clock,
    warmup: bool,
    upper: ChannelHandle,
    controller: DramController,
    in_service: Option<(Request, u64)>,
    sim_stats: DramStats,
    roi_stats: DramStats,
}

impl DramChannel {
    /// Creates a channel serving requests from `upper`.
    pub fn new(name: impl Into<String>, config: &DramConfig, upper: ChannelHandle) -> Self {
        let name = name.into();
        Self {
            clock: Clock::new(config.clock_scale),
            warmup: false,
            upper,
            controller: DramController::new(
                config.t_cas,
                config.t_ras,
                config.t_pre,
                config.row_bytes,
            ),
            in_service: None,
            sim_stats: DramStats::new(name.as_str()),
            roi_stats: DramStats::new(name.as_str()),
            name,
        }
    }

    /// Counters accumulated since the phase began.
    pub const fn sim_stats(&self) -> &DramStats {
        &self.sim_stats
    }

    /// Counters frozen when the core finished the phase.
    pub const fn roi_stats(&self) -> &DramStats {
        &self.roi_stats
    }
}

impl Operable for DramChannel {
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
        let mut progress = 0;

        if let Some((request, ready_at)) = self.in_service {
            if ready_at > now {
                return 0;
            }
            self.in_service = None;
            if request.kind == AccessType::Write {
                self.sim_stats.writes += 1;
            } else {
                self.sim_stats.reads += 1;
                self.upper.borrow_mut().respond(Response::from(&request));
            }
            progress += 1;
        }

        if let Some(request) = self.upper.borrow_mut().pop_request() {
            let access = self.controller.access(request.address);
            if access.row_hit {
                self.sim_stats.row_buffer_hits += 1;
            } else {
                self.sim_stats.row_buffer_misses += 1;
            }
            self.in_service = Some((request, now + access.latency));
            progress += 1;
        }
        progress
    }

    fn warmup(&self) -> bool {
        self.warmup
    }

    fn set_warmup(&mut self, warmup: bool) {
        self.warmup = warmup;
    }

    fn begin_phase(&mut self) {
        self.sim_stats = DramStats::new(self.name.as_str());
        self.roi_stats = DramStats::new(self.name.as_str());
    }

    fn end_phase(&mut self, _cpu: usize) {
        self.roi_stats = self.sim_stats.clone();
    }

    fn deadlock_state(&self) -> String {
        let upper = self.upper.borrow();
        format!(
            "{}: cycle {} in service {:?} queued {} returned {}",
            self.name,
            self.clock.current_cycle(),
            self.in_service.map(|(request, ready_at)| (request.address, ready_at)),
            upper.pending_requests(),
            upper.pending_responses(),
        )
    }
}
