//! Run Driver Tests.
//!
//! Whole runs over the synthetic machine: one-time initialization, discarded
//! warmup results, the replacement trace, and the appended whole-phase snapshot.

use pretty_assertions::assert_eq;
use tracesim_core::sim::{run, Snapshot};
use tracesim_core::trace::InstructionRecord;

use crate::common::builder;
use crate::common::harness;
use crate::common::mocks::env::{ScriptedCore, ScriptedOperable, SyntheticEnv};

const MAIN_BASE: u64 = 0x1000;
const REPLACEMENT_BASE: u64 = 0x9000;

fn main_trace() -> Vec<InstructionRecord> {
    builder::straight_line(MAIN_BASE, 100)
}

fn warmup_then_simulation() -> Vec<tracesim_core::sim::PhaseInfo> {
    vec![
        harness::phase("Warmup", true, 5, 0),
        harness::phase("Simulation", false, 5, 0),
    ]
}

// ══════════════════════════════════════════════════════════
// 1. Lifecycle
// ══════════════════════════════════════════════════════════

#[test]
fn operables_are_initialized_once() {
    let mut env = SyntheticEnv::new(ScriptedCore::new(64, 1)).with(ScriptedOperable::new("LLC"));
    let mut traces = [harness::trace("main", &main_trace())];

    let _ = run(&mut env, &warmup_then_simulation(), &mut traces, None).unwrap();

    assert_eq!(env.core.initialize_calls, 1);
    assert_eq!(env.others[0].initialize_calls, 1);
    assert_eq!(env.others[0].begin_calls, 2);
    assert_eq!(env.core.warmup_flags, vec![true, false]);
}

#[test]
fn warmup_results_are_discarded() {
    let mut env = SyntheticEnv::new(ScriptedCore::new(64, 1));
    let mut traces = [harness::trace("main", &main_trace())];

    let results = run(&mut env, &warmup_then_simulation(), &mut traces, None).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Simulation");
    assert_eq!(results[0].sim_cpu_stats[0].begin_instrs, 5);
    assert_eq!(results[0].sim_cpu_stats[0].instrs(), 5);
}

#[test]
fn warmup_only_run_has_no_results() {
    let mut env = SyntheticEnv::new(ScriptedCore::new(64, 1));
    let mut traces = [harness::trace("main", &main_trace())];
    let phases = [harness::phase("Warmup", true, 5, 0)];

    let results = run(&mut env, &phases, &mut traces, None).unwrap();
    assert!(results.is_empty());
}

// ══════════════════════════════════════════════════════════
// 2. Replacement trace
// ══════════════════════════════════════════════════════════

#[test]
fn replacement_feeds_only_after_warmup() {
    let mut env = SyntheticEnv::new(ScriptedCore::new(64, 1));
    let mut traces = [harness::trace("main", &main_trace())];
    let mut replacement = harness::trace("replacement", &builder::straight_line(REPLACEMENT_BASE, 20));

    let _ = run(&mut env, &warmup_then_simulation(), &mut traces, Some(&mut replacement)).unwrap();

    // Warmup fills 64 then tops up one per retirement for five cycles.
    let fed = &env.core.fed;
    let split = fed.iter().position(|&ip| ip >= REPLACEMENT_BASE).unwrap();
    assert_eq!(split, 69);
    assert!(fed[..split].iter().all(|&ip| ip < REPLACEMENT_BASE));
    assert!(fed[split..].iter().all(|&ip| ip >= REPLACEMENT_BASE));
    assert_eq!(fed.len() - split, 5);
    assert_eq!(traces[0].records_read(), 70, "main trace stops at warmup end");
}

#[test]
fn dry_replacement_ends_the_measured_phase() {
    let mut env = SyntheticEnv::new(ScriptedCore::new(64, 1));
    let mut traces = [harness::trace("main", &main_trace())];
    let mut replacement = harness::trace("replacement", &builder::straight_line(REPLACEMENT_BASE, 3));
    let phases = [
        harness::phase("Warmup", true, 5, 0),
        harness::phase("Simulation", false, 1000, 0),
    ];

    let results = run(&mut env, &phases, &mut traces, Some(&mut replacement)).unwrap();

    assert!(replacement.eof());
    assert!(!traces[0].eof());
    assert_eq!(results.len(), 1);
}

// ══════════════════════════════════════════════════════════
// 3. Final snapshot
// ══════════════════════════════════════════════════════════

#[test]
fn first_measured_phase_gets_a_whole_phase_snapshot() {
    let mut env = SyntheticEnv::new(ScriptedCore::new(64, 1));
    let mut traces = [harness::trace("main", &main_trace())];

    let results = run(&mut env, &warmup_then_simulation(), &mut traces, None).unwrap();

    let result = &results[0];
    assert_eq!(result.snapshots.len(), 1);
    assert_eq!(
        result.snapshots.last(),
        Some(&Snapshot {
            cpu_stats: result.sim_cpu_stats[0].clone(),
            cache_stats: result.sim_cache_stats.clone(),
        })
    );
}

#[test]
fn final_snapshot_follows_interval_snapshots() {
    let mut env = SyntheticEnv::new(ScriptedCore::new(64, 1));
    let mut traces = [harness::trace("main", &builder::straight_line(MAIN_BASE, 8))];
    let phases = [harness::phase("Simulation", false, u64::MAX, 4)];

    let results = run(&mut env, &phases, &mut traces, None).unwrap();

    let snapshots = &results[0].snapshots;
    assert_eq!(snapshots.len(), 3);
    assert_eq!(snapshots[2].cpu_stats, results[0].sim_cpu_stats[0]);
}

#[test]
fn only_the_first_measured_phase_is_annotated() {
    let mut env = SyntheticEnv::new(ScriptedCore::new(64, 1));
    let mut traces = [harness::trace("main", &main_trace())];
    let phases = [
        harness::phase("Simulation", false, 3, 0),
        harness::phase("Simulation", false, 3, 0),
    ];

    let results = run(&mut env, &phases, &mut traces, None).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].snapshots.len(), 1);
    assert!(results[1].snapshots.is_empty());
}
