//! DRAM Channel Tests.
//!
//! Row-buffer latencies through the controller, and the channel serving an
//! LLC-side queue one request at a time.

use tracesim_core::common::AccessType;
use tracesim_core::config::DramConfig;
use tracesim_core::sim::Operable;
use tracesim_core::soc::memory::controller::{DramController, RowAccess};
use tracesim_core::soc::memory::DramChannel;
use tracesim_core::soc::{Channel, ChannelHandle, Request, Response};

const T_CAS: u64 = 10;
const T_RAS: u64 = 20;
const T_PRE: u64 = 30;

// ══════════════════════════════════════════════════════════
// 1. Controller
// ══════════════════════════════════════════════════════════

#[test]
fn first_access_opens_a_row() {
    let mut ctrl = DramController::new(T_CAS, T_RAS, T_PRE, 2048);
    assert_eq!(
        ctrl.access(0x1000),
        RowAccess {
            latency: T_RAS + T_CAS,
            row_hit: false
        }
    );
}

#[test]
fn same_row_pays_only_cas() {
    let mut ctrl = DramController::new(T_CAS, T_RAS, T_PRE, 2048);
    let _ = ctrl.access(0x1000);
    let hit = ctrl.access(0x17c0);
    assert!(hit.row_hit);
    assert_eq!(hit.latency, T_CAS);
}

#[test]
fn row_conflict_pays_precharge() {
    let mut ctrl = DramController::new(T_CAS, T_RAS, T_PRE, 2048);
    let _ = ctrl.access(0x1000);
    assert_eq!(ctrl.access(0x1800).latency, T_PRE + T_RAS + T_CAS);
    assert!(ctrl.access(0x1800).row_hit);
}

#[test]
fn row_size_rounds_up_to_a_power_of_two() {
    let mut ctrl = DramController::new(T_CAS, T_RAS, T_PRE, 1500);
    let _ = ctrl.access(0);
    assert!(ctrl.access(2047).row_hit);
    assert!(!ctrl.access(2048).row_hit);
}

// ══════════════════════════════════════════════════════════
// 2. Channel
// ══════════════════════════════════════════════════════════

fn dram() -> (DramChannel, ChannelHandle) {
    let config = DramConfig {
        t_cas: T_CAS,
        t_ras: T_RAS,
        t_pre: T_PRE,
        clock_scale: 1.0,
        ..DramConfig::default()
    };
    let upper = Channel::shared(8);
    (DramChannel::new("DRAM", &config, upper.clone()), upper)
}

fn send(upper: &ChannelHandle, address: u64, kind: AccessType, instr_id: u64) {
    let sent = upper.borrow_mut().send(Request {
        address,
        ip: 0,
        kind,
        instr_id,
        cpu: 0,
        metadata: 0,
    });
    assert!(sent);
}

fn tick_until(dram: &mut DramChannel, cycle: u64) {
    while dram.clock().current_cycle() < cycle {
        let _ = dram.tick();
    }
}

fn responses(upper: &ChannelHandle) -> Vec<Response> {
    let mut upper = upper.borrow_mut();
    std::iter::from_fn(|| upper.pop_response()).collect()
}

#[test]
fn read_returns_after_row_latency() {
    let (mut dram, upper) = dram();
    send(&upper, 0x4000, AccessType::Load, 7);

    tick_until(&mut dram, T_RAS + T_CAS);
    assert!(responses(&upper).is_empty());
    tick_until(&mut dram, T_RAS + T_CAS + 1);

    let returned = responses(&upper);
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].instr_id, 7);
    assert_eq!(dram.sim_stats().reads, 1);
    assert_eq!(dram.sim_stats().row_buffer_misses, 1);
}

#[test]
fn requests_are_served_one_at_a_time() {
    let (mut dram, upper) = dram();
    send(&upper, 0x4000, AccessType::Load, 1);
    send(&upper, 0x4040, AccessType::Load, 2);

    let first_done = 1 + T_RAS + T_CAS;
    tick_until(&mut dram, first_done);
    assert_eq!(responses(&upper).len(), 1);
    assert_eq!(upper.borrow().pending_requests(), 0);

    tick_until(&mut dram, first_done + T_CAS);
    let second = responses(&upper);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].instr_id, 2);
    assert_eq!(dram.sim_stats().row_buffer_hits, 1);
}

#[test]
fn writes_complete_silently_and_first() {
    let (mut dram, upper) = dram();
    send(&upper, 0x4000, AccessType::Load, 1);
    send(&upper, 0x9000, AccessType::Write, 2);

    tick_until(&mut dram, 200);

    let returned = responses(&upper);
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].address, 0x4000);
    assert_eq!(dram.sim_stats().writes, 1);
    assert_eq!(dram.sim_stats().reads, 1);
    assert_eq!(dram.sim_stats().row_buffer_misses, 2);
}

#[test]
fn idle_channel_makes_no_progress() {
    let (mut dram, _upper) = dram();
    assert_eq!(dram.tick(), 0);
    assert!(dram.deadlock_state().starts_with("DRAM"));
}

#[test]
fn phase_boundaries_reset_and_freeze() {
    let (mut dram, upper) = dram();
    send(&upper, 0x4000, AccessType::Load, 1);
    tick_until(&mut dram, 100);

    dram.end_phase(0);
    assert_eq!(dram.roi_stats().reads, 1);
    dram.begin_phase();
    assert_eq!(dram.sim_stats().reads, 0);
    assert_eq!(dram.sim_stats().name, "DRAM");
}

#[test]
fn default_clock_runs_four_of_five_cycles() {
    let upper = Channel::shared(8);
    let mut dram = DramChannel::new("DRAM", &DramConfig::default(), upper);
    let mut operated = 0;
    for _ in 0..500 {
        let before = dram.clock().current_cycle();
        let _ = dram.tick();
        if dram.clock().current_cycle() > before {
            operated += 1;
        }
    }
    assert_eq!(operated, 400);
}
