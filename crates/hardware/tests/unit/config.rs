//! Configuration Tests.
//!
//! Defaults, JSON parsing, validation, and resolution of the run into phases.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tracesim_core::config::{BranchPredictor, Config, Prefetcher, ReplacementPolicy, RunConfig};
use tracesim_core::trace::TraceFormat;
use tracesim_core::ConfigError;

use crate::common::builder;
use crate::common::harness;

fn run_with_traces(traces: &[&str]) -> RunConfig {
    RunConfig {
        traces: traces.iter().map(PathBuf::from).collect(),
        snapshot_folder: Some(PathBuf::from("snapshots")),
        ..RunConfig::default()
    }
}

// ══════════════════════════════════════════════════════════
// 1. Defaults
// ══════════════════════════════════════════════════════════

#[test]
fn default_machine_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.core.in_queue_size, 64);
    assert_eq!(config.core.branch_predictor, BranchPredictor::Bimodal);
    assert_eq!(config.cache.l1_i.prefetcher, Prefetcher::Fdip);
    assert_eq!(config.cache.l1_d.prefetcher, Prefetcher::NextLine);
    assert_eq!(config.cache.llc.policy, ReplacementPolicy::Lru);
    assert!((config.dram.clock_scale - 1.25).abs() < f64::EPSILON);
}

#[test]
fn default_run_snapshots_every_million() {
    let run = RunConfig::default();
    assert_eq!(run.snapshot_rate, 1_000_000);
    assert_eq!(run.trace_format, TraceFormat::Standard);
    assert_eq!(run.simulation_length(), u64::MAX);
    assert_eq!(run.warmup_length(), 0);
    assert!(!run.repeats());
}

// ══════════════════════════════════════════════════════════
// 2. Derived run parameters
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::explicit_warmup(Some(7), Some(1000), 7)]
#[case::fifth_of_simulation(None, Some(1000), 200)]
#[case::rounds_down(None, Some(9), 1)]
#[case::no_lengths(None, None, 0)]
fn warmup_length_resolution(
    #[case] warmup: Option<u64>,
    #[case] simulation: Option<u64>,
    #[case] expected: u64,
) {
    let run = RunConfig {
        warmup_instructions: warmup,
        simulation_instructions: simulation,
        ..RunConfig::default()
    };
    assert_eq!(run.warmup_length(), expected);
}

#[test]
fn huge_simulation_length_does_not_overflow_warmup() {
    let run = RunConfig {
        simulation_instructions: Some(u64::MAX),
        ..RunConfig::default()
    };
    assert_eq!(run.warmup_length(), u64::MAX / 10);
}

#[rstest]
#[case(None, None, false)]
#[case(None, Some(100), true)]
#[case(Some(false), Some(100), false)]
#[case(Some(true), None, true)]
fn repeat_defaults_to_bounded_simulation(
    #[case] repeat: Option<bool>,
    #[case] simulation: Option<u64>,
    #[case] expected: bool,
) {
    let run = RunConfig {
        repeat_traces: repeat,
        simulation_instructions: simulation,
        ..RunConfig::default()
    };
    assert_eq!(run.repeats(), expected);
}

// ══════════════════════════════════════════════════════════
// 3. Phases
// ══════════════════════════════════════════════════════════

#[test]
fn phases_are_warmup_then_simulation() {
    let run = RunConfig {
        simulation_instructions: Some(500),
        snapshot_rate: 50,
        ..run_with_traces(&["a.trace"])
    };
    let phases = run.phases().unwrap();

    assert_eq!(phases.len(), 2);
    assert_eq!(phases[0].name, "Warmup");
    assert!(phases[0].is_warmup);
    assert_eq!(phases[0].length, 100);
    assert_eq!(phases[0].snapshot_rate, 0);
    assert_eq!(phases[1].name, "Simulation");
    assert!(!phases[1].is_warmup);
    assert_eq!(phases[1].length, 500);
    assert_eq!(phases[1].snapshot_rate, 50);
    assert_eq!(phases[1].trace_index, vec![0]);
    assert_eq!(phases[1].trace_names, vec!["a.trace".to_string()]);
}

#[test]
fn snapshot_folder_is_checked_first() {
    let run = RunConfig::default();
    assert!(matches!(run.phases(), Err(ConfigError::MissingSnapshotFolder)));
}

#[test]
fn at_least_one_trace_is_required() {
    let run = run_with_traces(&[]);
    assert!(matches!(run.phases(), Err(ConfigError::NoTraces)));
}

#[test]
fn traces_open_with_the_run_format() {
    let file = harness::trace_file(&builder::straight_line(0x1000, 4), TraceFormat::Interpreter);
    let run = RunConfig {
        trace_format: TraceFormat::Interpreter,
        traces: vec![file.path().to_path_buf()],
        replacement_trace: Some(file.path().to_path_buf()),
        simulation_instructions: Some(10),
        ..RunConfig::default()
    };

    let mut traces = run.open_traces().unwrap();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].format(), TraceFormat::Interpreter);
    assert_eq!(traces[0].by_ref().take(6).count(), 6, "bounded runs repeat");

    let mut replacement = run.open_replacement().unwrap().unwrap();
    assert_eq!(harness::drain_ips(&mut replacement).len(), 4, "replacement never repeats");
}

#[test]
fn no_replacement_configured() {
    assert!(RunConfig::default().open_replacement().unwrap().is_none());
}

// ══════════════════════════════════════════════════════════
// 4. JSON
// ══════════════════════════════════════════════════════════

#[test]
fn empty_object_is_the_default_machine() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.cache.l2.sets, Config::default().cache.l2.sets);
    assert_eq!(config.run.snapshot_rate, 1_000_000);
}

#[test]
fn json_overrides_selected_fields() {
    let json = r#"{
        "run": {
            "traces": ["x.trace"],
            "trace_format": "Cloudsuite",
            "warmup_instructions": 10,
            "snapshot_folder": "out"
        },
        "core": { "branch_predictor": "TAGE", "retire_width": 2 },
        "cache": {
            "l1_d": { "sets": 128, "policy": "FIFO", "prefetcher": "Stride" }
        },
        "dram": { "t_cas": 20 }
    }"#;
    let config = Config::from_json(json).unwrap();

    assert_eq!(config.run.trace_format, TraceFormat::Cloudsuite);
    assert_eq!(config.run.warmup_length(), 10);
    assert_eq!(config.core.branch_predictor, BranchPredictor::Tage);
    assert_eq!(config.core.retire_width, 2);
    assert_eq!(config.core.fetch_width, 6);
    assert_eq!(config.cache.l1_d.sets, 128);
    assert_eq!(config.cache.l1_d.policy, ReplacementPolicy::Fifo);
    assert_eq!(config.cache.l1_d.prefetcher, Prefetcher::Stride);
    assert_eq!(config.cache.l1_d.ways, 8, "unlisted fields take the generic default");
    assert_eq!(config.cache.l1_i.prefetcher, Prefetcher::Fdip);
    assert_eq!(config.dram.t_cas, 20);
    assert_eq!(config.dram.t_ras, 14);
}

#[test]
fn malformed_json_is_reported() {
    assert!(matches!(Config::from_json("{ nope"), Err(ConfigError::Json(_))));
}

// ══════════════════════════════════════════════════════════
// 5. Validation
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::sets_not_power_of_two(r#"{ "cache": { "l2": { "sets": 1000 } } }"#, "L2C")]
#[case::zero_ways(r#"{ "cache": { "llc": { "ways": 0 } } }"#, "LLC")]
#[case::zero_mshr(r#"{ "cache": { "l1_i": { "mshr_size": 0 } } }"#, "L1I")]
#[case::slow_clock(r#"{ "cache": { "l1_d": { "clock_scale": 0.5 } } }"#, "L1D")]
fn invalid_cache_is_named(#[case] json: &str, #[case] cache: &str) {
    match Config::from_json(json) {
        Err(ConfigError::InvalidCache { name, .. }) => assert_eq!(name, cache),
        other => panic!("expected InvalidCache for {cache}, got {other:?}"),
    }
}

#[test]
fn dram_clock_below_one_is_rejected() {
    let json = r#"{ "dram": { "clock_scale": 0.9 } }"#;
    assert!(matches!(
        Config::from_json(json),
        Err(ConfigError::InvalidCache { ref name, .. }) if name == "DRAM"
    ));
}

#[rstest]
#[case::retire_width(r#"{ "core": { "retire_width": 0 } }"#)]
#[case::input_queue(r#"{ "core": { "in_queue_size": 0 } }"#)]
fn zero_sized_core_resource_is_rejected(#[case] json: &str) {
    assert!(matches!(Config::from_json(json), Err(ConfigError::InvalidCore(_))));
}

#[test]
fn counter_table_must_be_power_of_two() {
    let json = r#"{ "core": { "bimodal_table_size": 1000 } }"#;
    assert!(matches!(Config::from_json(json), Err(ConfigError::InvalidPredictor(_))));
}

#[test]
fn tage_tables_are_checked_only_when_selected() {
    let bad_tage = r#"{ "core": { "tage": { "num_banks": 3 } } }"#;
    assert!(Config::from_json(bad_tage).is_ok());

    let selected = r#"{ "core": { "branch_predictor": "Tage", "tage": { "num_banks": 3 } } }"#;
    assert!(matches!(
        Config::from_json(selected),
        Err(ConfigError::InvalidPredictor(_))
    ));
}
