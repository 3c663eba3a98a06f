//! Request/response queues linking adjacent levels of the memory hierarchy.
//!
//! A [`Channel`] sits between an upper component (core or cache) and a lower one
//! (cache or DRAM). It provides:
//! 1. **Bounded request queues:** reads, writes, and prefetches, each with its own
//!    capacity. A full queue refuses new requests, which is how backpressure
//!    propagates upward.
//! 2. **Responses:** completed reads returned to the upper component.
//! 3. **Branch events:** resolved branches forwarded from the core to the
//!    instruction cache's prefetcher.
//!
//! Both ends hold a [`ChannelHandle`]; the simulation is single-threaded.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::common::data::AccessType;
use crate::core::units::prefetch::BranchEvent;

/// Shared ownership of a channel by its two endpoints.
pub type ChannelHandle = Rc<RefCell<Channel>>;

/// A memory request travelling down the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// Requested address.
    pub address: u64,
    /// Address of the instruction that caused the request.
    pub ip: u64,
    /// Access type.
    pub kind: AccessType,
    /// Identifier the requester uses to match the response.
    pub instr_id: u64,
    /// Originating core.
    pub cpu: usize,
    /// Prefetcher metadata carried with the request.
    pub metadata: u32,
}

/// A completed request travelling up the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// Requested address.
    pub address: u64,
    /// Identifier copied from the request.
    pub instr_id: u64,
    /// Access type of the request.
    pub kind: AccessType,
    /// Prefetcher metadata returned with the data.
    pub metadata: u32,
}

impl From<&Request> for Response {
    fn from(request: &Request) -> Self {
        Self {
            address: request.address,
            instr_id: request.instr_id,
            kind: request.kind,
            metadata: request.metadata,
        }
    }
}

/// Queues between two levels of the hierarchy.
#[derive(Debug, Clone)]
pub struct Channel {
    rq: VecDeque<Request>,
    wq: VecDeque<Request>,
    pq: VecDeque<Request>,
    rq_size: usize,
    wq_size: usize,
    pq_size: usize,
    returned: VecDeque<Response>,
    branches: VecDeque<BranchEvent>,
}

impl Channel {
    /// Creates a channel with the given read, write, and prefetch queue capacities.
    pub fn new(rq_size: usize, wq_size: usize, pq_size: usize) -> Self {
        Self {
            rq: VecDeque::with_capacity(rq_size),
            wq: VecDeque::with_capacity(wq_size),
            pq: VecDeque::with_capacity(pq_size),
            rq_size,
            wq_size,
            pq_size,
            returned: VecDeque::new(),
            branches: VecDeque::new(),
        }
    }

    /// Creates a channel with every queue sized `queue_size`, ready to share.
    pub fn shared(queue_size: usize) -> ChannelHandle {
        Rc::new(RefCell::new(Self::new(queue_size, queue_size, queue_size)))
    }

    const fn queue_for(kind: AccessType) -> QueueKind {
        match kind {
            AccessType::Write => QueueKind::Write,
            AccessType::Prefetch => QueueKind::Prefetch,
            AccessType::Load => QueueKind::Read,
        }
    }

    /// Free slots in the queue that would receive a request of `kind`.
    pub fn free_slots(&self, kind: AccessType) -> usize {
        match Self::queue_for(kind) {
            QueueKind::Read => self.rq_size.saturating_sub(self.rq.len()),
            QueueKind::Write => self.wq_size.saturating_sub(self.wq.len()),
            QueueKind::Prefetch => self.pq_size.saturating_sub(self.pq.len()),
        }
    }

    /// Enqueues a request.
    ///
    /// # Returns
    ///
    /// `false` if the target queue is full; the request is not enqueued.
    pub fn send(&mut self, request: Request) -> bool {
        if self.free_slots(request.kind) == 0 {
            return false;
        }
        match Self::queue_for(request.kind) {
            QueueKind::Read => self.rq.push_back(request),
            QueueKind::Write => self.wq.push_back(request),
            QueueKind::Prefetch => self.pq.push_back(request),
        }
        true
    }

    /// The request the lower level should handle next: writes, then reads, then prefetches.
    pub fn peek_request(&self) -> Option<&Request> {
        self.wq
            .front()
            .or_else(|| self.rq.front())
            .or_else(|| self.pq.front())
    }

    /// Removes and returns the request `peek_request` would return.
    pub fn pop_request(&mut self) -> Option<Request> {
        self.wq
            .pop_front()
            .or_else(|| self.rq.pop_front())
            .or_else(|| self.pq.pop_front())
    }

    /// Requests waiting in all queues.
    pub fn pending_requests(&self) -> usize {
        self.rq.len() + self.wq.len() + self.pq.len()
    }

    /// Returns a completed request to the upper level.
    pub fn respond(&mut self, response: Response) {
        self.returned.push_back(response);
    }

    /// Takes the oldest returned response.
    pub fn pop_response(&mut self) -> Option<Response> {
        self.returned.pop_front()
    }

    /// Responses waiting for the upper level.
    pub fn pending_responses(&self) -> usize {
        self.returned.len()
    }

    /// Forwards a resolved branch to the lower level's prefetcher.
    pub fn notify_branch(&mut self, event: BranchEvent) {
        self.branches.push_back(event);
    }

    /// Takes every forwarded branch event, oldest first.
    pub fn take_branches(&mut self) -> VecDeque<BranchEvent> {
        std::mem::take(&mut self.branches)
    }
}

#[derive(Debug, Clone, Copy)]
enum QueueKind {
    Read,
    Write,
    Prefetch,
}
