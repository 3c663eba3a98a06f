//! Phase and run drivers: the cycle-stepped scheduler.
//!
//! `run_phase` advances a machine one simulated cycle at a time until every core
//! completes the phase. Each cycle it:
//! 1. **Dispatches** every operable once, in the order left by the previous cycle.
//! 2. **Watches** total progress and fails with [`SimError::Deadlock`] after
//!    `DEADLOCK_CYCLE` consecutive cycles without any.
//! 3. **Re-sorts** the dispatch order by ascending leap value (effective next cycle).
//! 4. **Feeds** each core's input queue from its trace, or from the replacement
//!    trace once warmup is over, capturing snapshots on the way.
//! 5. **Completes** cores whose trace ran dry (all cores) or whose phase length is reached.
//!
//! `run` initializes the machine, runs every phase, keeps only measured results,
//! and appends one whole-phase snapshot.

use std::time::Instant;

use tracing::{error, info};

use crate::common::constants::DEADLOCK_CYCLE;
use crate::common::error::{ConfigError, SimError};
use crate::sim::deadlock::{DeadlockMonitor, DeadlockState};
use crate::sim::environment::{CoreModel, Environment};
use crate::sim::phase::{PhaseInfo, PhaseStats, Snapshot};
use crate::trace::TraceReader;

/// Runs one phase to completion.
///
/// # Arguments
///
/// * `phase` - The phase descriptor.
/// * `env` - The machine. Must hold exactly one core.
/// * `traces` - One reader per trace slot, indexed by `phase.trace_index`.
/// * `replacement` - Reader that feeds every core outside warmup, when present.
///
/// # Returns
///
/// The phase statistics, or an error if the machine deadlocks, a trace fails to
/// read, or the phase maps a core to a missing trace.
pub fn run_phase<E: Environment + ?Sized>(
    phase: &PhaseInfo,
    env: &mut E,
    traces: &mut [TraceReader],
    mut replacement: Option<&mut TraceReader>,
) -> Result<PhaseStats, SimError> {
    let cores = env.core_count();
    if cores != 1 {
        return Err(SimError::UnsupportedCoreCount(cores));
    }
    let trace_names = resolve_trace_names(phase, cores, traces.len())?;

    let operables = env.operable_count();
    for index in 0..operables {
        if let Some(op) = env.operable_mut(index) {
            op.set_warmup(phase.is_warmup);
            op.begin_phase();
        }
    }

    let started = Instant::now();
    let mut order: Vec<usize> = (0..operables).collect();
    let mut monitor = DeadlockMonitor::new(DEADLOCK_CYCLE);
    let mut cycle: u64 = 0;
    let mut fetched_since_snapshot: u64 = 0;
    let mut snapshots = Vec::new();
    let mut complete = vec![false; cores];

    while !complete.iter().all(|&done| done) {
        let mut next_complete = complete.clone();

        let mut progress: u64 = 0;
        for &index in &order {
            if let Some(op) = env.operable_mut(index) {
                progress += op.tick();
            }
        }
        cycle += 1;

        if let DeadlockState::Aborted(stalled_cycles) = monitor.observe(progress) {
            let dumps = dump_deadlock_state(env, &order);
            return Err(SimError::Deadlock {
                cycle,
                stalled_cycles,
                dumps,
            });
        }

        let leaps: Vec<f64> = (0..operables)
            .map(|index| env.operable(index).map_or(0.0, |op| op.leap_value()))
            .collect();
        order.sort_by(|&a, &b| leaps[a].total_cmp(&leaps[b]));

        for cpu in 0..cores {
            let reader: &mut TraceReader = match replacement.as_deref_mut() {
                Some(reader) if !phase.is_warmup => reader,
                _ => &mut traces[phase.trace_index[cpu]],
            };

            let mut free = env.core(cpu).map_or(0, |core| core.input_capacity());
            while free > 0 && !reader.eof() {
                let Some(instr) = reader.next_instruction()? else {
                    break;
                };
                if let Some(core) = env.core_mut(cpu) {
                    core.push_instruction(instr);
                }
                free -= 1;

                if !phase.is_warmup {
                    fetched_since_snapshot += 1;
                    if phase.snapshot_rate > 0 && fetched_since_snapshot >= phase.snapshot_rate {
                        if let Some(snapshot) = capture_snapshot(env, cpu) {
                            snapshots.push(snapshot);
                        }
                        fetched_since_snapshot = 0;
                    }
                }
            }

            // One core per run: a dry trace ends the phase for everyone.
            if reader.eof() {
                next_complete.fill(true);
            }
        }

        for (cpu, done) in next_complete.iter_mut().enumerate() {
            *done = *done
                || env
                    .core(cpu)
                    .is_some_and(|core| core.phase_instrs() >= phase.length);
        }

        for cpu in (0..cores).filter(|&cpu| next_complete[cpu] != complete[cpu]) {
            for index in 0..operables {
                if let Some(op) = env.operable_mut(index) {
                    op.end_phase(cpu);
                }
            }
            log_progress(env, &phase.name, "finished", cpu, started);
        }

        complete = next_complete;
    }

    for cpu in 0..cores {
        log_progress(env, &phase.name, "complete", cpu, started);
    }

    Ok(collect_phase_stats(phase, env, trace_names, snapshots))
}

/// Runs every phase in order.
///
/// Every operable is initialized once before the first phase. Results of warmup
/// phases are discarded. When at least one measured phase ran, its whole-phase
/// counters are appended to the first measured result as a final snapshot.
pub fn run<E: Environment + ?Sized>(
    env: &mut E,
    phases: &[PhaseInfo],
    traces: &mut [TraceReader],
    mut replacement: Option<&mut TraceReader>,
) -> Result<Vec<PhaseStats>, SimError> {
    for index in 0..env.operable_count() {
        if let Some(op) = env.operable_mut(index) {
            op.initialize();
        }
    }

    let mut results = Vec::new();
    for phase in phases {
        let stats = run_phase(phase, env, traces, replacement.as_deref_mut())?;
        if !phase.is_warmup {
            results.push(stats);
        }
    }

    if let Some(first) = results.first_mut() {
        if let Some(cpu_stats) = first.sim_cpu_stats.first().cloned() {
            let cache_stats = first.sim_cache_stats.clone();
            first.snapshots.push(Snapshot {
                cpu_stats,
                cache_stats,
            });
        }
    }

    Ok(results)
}

fn resolve_trace_names(
    phase: &PhaseInfo,
    cores: usize,
    available: usize,
) -> Result<Vec<String>, ConfigError> {
    let available = available.min(phase.trace_names.len());
    (0..cores)
        .map(|core| {
            let index = phase.trace_index.get(core).copied().unwrap_or(usize::MAX);
            if index < available {
                Ok(phase.trace_names[index].clone())
            } else {
                Err(ConfigError::TraceIndexOutOfRange {
                    phase: phase.name.clone(),
                    core,
                    index,
                    available,
                })
            }
        })
        .collect()
}

fn dump_deadlock_state<E: Environment + ?Sized>(env: &E, order: &[usize]) -> Vec<String> {
    order
        .iter()
        .filter_map(|&index| env.operable(index))
        .map(|op| {
            let state = op.deadlock_state();
            error!(component = op.name(), "{state}");
            state
        })
        .collect()
}

fn capture_snapshot<E: Environment + ?Sized>(env: &E, cpu: usize) -> Option<Snapshot> {
    let core = env.core(cpu)?;
    let mut cpu_stats = core.sim_stats().clone();
    cpu_stats.end_instrs = core.retired();
    cpu_stats.end_cycles = core.current_cycle();
    Some(Snapshot {
        cpu_stats,
        cache_stats: env.cache_stats(),
    })
}

fn log_progress<E: Environment + ?Sized>(
    env: &E,
    phase: &str,
    event: &str,
    cpu: usize,
    started: Instant,
) {
    let Some(core) = env.core(cpu) else {
        return;
    };
    let instructions = core.phase_instrs();
    let cycles = core.phase_cycles();
    let ipc = if cycles == 0 {
        0.0
    } else {
        instructions as f64 / cycles as f64
    };
    info!(
        phase,
        cpu,
        instructions,
        cycles,
        ipc,
        elapsed_secs = started.elapsed().as_secs(),
        "{phase} {event} CPU {cpu}"
    );
}

fn collect_phase_stats<E: Environment + ?Sized>(
    phase: &PhaseInfo,
    env: &E,
    trace_names: Vec<String>,
    snapshots: Vec<Snapshot>,
) -> PhaseStats {
    let cores: Vec<&dyn CoreModel> = (0..env.core_count())
        .filter_map(|cpu| env.core(cpu))
        .collect();

    PhaseStats {
        name: phase.name.clone(),
        trace_names,
        sim_cpu_stats: cores.iter().map(|core| core.sim_stats().clone()).collect(),
        roi_cpu_stats: cores.iter().map(|core| core.roi_stats().clone()).collect(),
        sim_cache_stats: env.cache_stats(),
        roi_cache_stats: env.roi_cache_stats(),
        sim_dram_stats: env.dram_stats(),
        roi_dram_stats: env.roi_dram_stats(),
        snapshots,
    }
}
