//! Statistics Helper Tests.

use tracesim_core::common::AccessType;
use tracesim_core::stats::{CacheStats, CoreStats, DramStats};
use tracesim_core::trace::BranchKind;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ══════════════════════════════════════════════════════════
// 1. Core
// ══════════════════════════════════════════════════════════

#[test]
fn fresh_core_stats_are_zero() {
    let stats = CoreStats::new("cpu0");
    assert_eq!(stats.name, "cpu0");
    assert_eq!(stats.instrs(), 0);
    assert!(close(stats.ipc(), 0.0));
    assert!(close(stats.branch_mpki(), 0.0));
}

#[test]
fn mpki_counts_every_branch_kind() {
    let mut stats = CoreStats {
        begin_instrs: 1_000,
        end_instrs: 5_000,
        begin_cycles: 0,
        end_cycles: 8_000,
        ..CoreStats::new("cpu0")
    };
    stats.branch_type_counts[BranchKind::Conditional.index()] = 300;
    stats.branch_type_counts[BranchKind::Return.index()] = 100;
    stats.branch_type_misses[BranchKind::Conditional.index()] = 10;
    stats.branch_type_misses[BranchKind::Indirect.index()] = 2;

    assert_eq!(stats.total_branches(), 400);
    assert_eq!(stats.total_mispredictions(), 12);
    assert!(close(stats.branch_mpki(), 3.0));
    assert!(close(stats.ipc(), 0.5));
}

#[test]
fn window_never_underflows() {
    let stats = CoreStats {
        begin_instrs: 10,
        end_instrs: 4,
        begin_cycles: 10,
        end_cycles: 4,
        ..CoreStats::new("cpu0")
    };
    assert_eq!(stats.instrs(), 0);
    assert_eq!(stats.cycles(), 0);
}

// ══════════════════════════════════════════════════════════
// 2. Cache
// ══════════════════════════════════════════════════════════

#[test]
fn totals_sum_every_access_type() {
    let mut stats = CacheStats::new("LLC");
    stats.hits[AccessType::Load.index()] = 5;
    stats.hits[AccessType::Write.index()] = 2;
    stats.misses[AccessType::Prefetch.index()] = 3;
    stats.misses[AccessType::Load.index()] = 1;

    assert_eq!(stats.total_hits(), 7);
    assert_eq!(stats.total_misses(), 4);
}

#[test]
fn fetch_packets_exclude_prefetch_lookups() {
    let mut stats = CacheStats::new("cpu0_L1I");
    stats.hits[AccessType::Load.index()] = 90;
    stats.misses[AccessType::Load.index()] = 10;
    stats.hits[AccessType::Prefetch.index()] = 4;
    stats.misses[AccessType::Prefetch.index()] = 6;
    stats.pf_requested = 10;

    assert_eq!(stats.fetch_packets(), 100);
}

#[test]
fn average_miss_latency() {
    let mut stats = CacheStats::new("cpu0_L2C");
    assert!(close(stats.avg_miss_latency(), 0.0));

    stats.misses[AccessType::Load.index()] = 4;
    stats.total_miss_latency = 90;
    assert!(close(stats.avg_miss_latency(), 22.5));
}

// ══════════════════════════════════════════════════════════
// 3. Serialization
// ══════════════════════════════════════════════════════════

#[test]
fn stats_serialize_by_field_name() {
    let mut dram = DramStats::new("DRAM");
    dram.reads = 3;
    let json = serde_json::to_value(&dram).unwrap();
    assert_eq!(json["name"], "DRAM");
    assert_eq!(json["reads"], 3);

    let core = serde_json::to_value(CoreStats::new("cpu0")).unwrap();
    assert_eq!(core["branch_type_counts"].as_array().map(Vec::len), Some(BranchKind::COUNT));
}
