//! Configuration system for the simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! a run. It provides:
//! 1. **Defaults:** Baseline machine constants (queue sizes, cache geometry, DRAM timing).
//! 2. **Structures:** Hierarchical config for the run, the core, the caches, and DRAM.
//! 3. **Enums:** Replacement policy, prefetcher, and branch predictor types.
//! 4. **Resolution:** Validation and turning the run section into phase descriptors.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built with `Config::default()`.

use std::path::PathBuf;

use serde::Deserialize;

use crate::common::error::{ConfigError, TraceError};
use crate::sim::phase::PhaseInfo;
use crate::trace::{TraceFormat, TraceReader};

/// Default configuration constants for the simulator.
mod defaults {
    /// Instructions between statistics snapshots.
    pub const SNAPSHOT_RATE: u64 = 1_000_000;

    /// Fraction of the simulation length used for warmup when only the former is given.
    pub const WARMUP_NUMERATOR: u64 = 2;
    /// Denominator of the warmup fraction.
    pub const WARMUP_DENOMINATOR: u64 = 10;

    /// Core input queue capacity (instructions).
    pub const IN_QUEUE_SIZE: usize = crate::common::constants::IN_QUEUE_SIZE;
    /// Reorder buffer capacity.
    pub const ROB_SIZE: usize = 352;
    /// Instructions dispatched per cycle.
    pub const FETCH_WIDTH: usize = 6;
    /// Instructions retired per cycle.
    pub const RETIRE_WIDTH: usize = 5;
    /// Cycles between dispatch and completion of a non-memory instruction.
    pub const EXECUTE_LATENCY: u64 = 1;
    /// Fetch bubble after a mispredicted branch.
    pub const MISPREDICT_PENALTY: u64 = 20;
    /// Bimodal predictor table size.
    pub const BIMODAL_TABLE_SIZE: usize = 16384;

    /// Cache block requests each level accepts per channel before pushing back.
    pub const CHANNEL_QUEUE_SIZE: usize = 32;
    /// Default cache sets.
    pub const CACHE_SETS: usize = 64;
    /// Default cache associativity.
    pub const CACHE_WAYS: usize = 8;
    /// Default MSHR entries.
    pub const CACHE_MSHR: usize = 8;
    /// Default internal prefetch queue size.
    pub const CACHE_PQ: usize = 32;
    /// Default hit latency in cycles.
    pub const CACHE_LATENCY: u64 = 4;
    /// Default tag lookups per cycle.
    pub const CACHE_TAG_CHECKS: usize = 2;
    /// Default prefetch degree.
    pub const PREFETCH_DEGREE: usize = 1;
    /// Default stride prefetcher table size.
    pub const PREFETCH_TABLE_SIZE: usize = 64;

    /// CAS latency in DRAM cycles.
    pub const T_CAS: u64 = 14;
    /// RAS latency in DRAM cycles.
    pub const T_RAS: u64 = 14;
    /// Precharge latency in DRAM cycles.
    pub const T_PRE: u64 = 14;
    /// DRAM row size in bytes.
    pub const ROW_BYTES: u64 = 2048;
    /// Core cycles per DRAM cycle.
    pub const DRAM_CLOCK_SCALE: f64 = 1.25;

    /// Default number of TAGE predictor banks (4 tagged tables).
    pub const TAGE_BANKS: usize = 4;
    /// Default TAGE predictor table size (2048 entries per bank).
    pub const TAGE_TABLE_SIZE: usize = 2048;
    /// Default TAGE loop predictor table size (256 entries).
    pub const TAGE_LOOP_SIZE: usize = 256;
    /// Default TAGE useful counter reset interval (256K branches).
    pub const TAGE_RESET_INTERVAL: u32 = 256_000;
}

/// Cache replacement policy algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Least Recently Used replacement policy.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// First In First Out replacement policy.
    #[serde(alias = "Fifo")]
    Fifo,
}

/// Hardware prefetcher attached to a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Prefetcher {
    /// No prefetching enabled.
    #[default]
    None,
    /// Prefetches the next sequential block(s) after each access.
    NextLine,
    /// Detects constant-stride access patterns.
    Stride,
    /// Fetch-directed instruction prefetching driven by branch targets.
    #[serde(alias = "FDIP")]
    Fdip,
}

/// Branch prediction algorithm types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BranchPredictor {
    /// Table of 2-bit counters indexed by ip.
    #[default]
    Bimodal,
    /// Global history XOR ip indexed counters.
    GShare,
    /// Tagged Geometric History Length predictor.
    #[serde(alias = "TAGE")]
    Tage,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use tracesim_core::config::{Config, Prefetcher};
///
/// let json = r#"{
///     "run": {
///         "traces": ["bench.trace"],
///         "simulation_instructions": 1000000,
///         "snapshot_folder": "snapshots"
///     },
///     "cache": { "l1_i": { "prefetcher": "Fdip" } }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.run.warmup_length(), 200000);
/// assert_eq!(config.cache.l1_i.prefetcher, Prefetcher::Fdip);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Run-level parameters (lengths, traces, snapshots)
    #[serde(default)]
    pub run: RunConfig,
    /// Core parameters
    #[serde(default)]
    pub core: CoreConfig,
    /// Cache hierarchy configuration
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
    /// Main memory configuration
    #[serde(default)]
    pub dram: DramConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every machine parameter. Run parameters are checked by [`RunConfig::phases`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.core.validate()?;
        for (name, cache) in [
            ("L1I", &self.cache.l1_i),
            ("L1D", &self.cache.l1_d),
            ("L2C", &self.cache.l2),
            ("LLC", &self.cache.llc),
        ] {
            cache.validate(name)?;
        }
        if !(self.dram.clock_scale >= 1.0) {
            return Err(ConfigError::InvalidCache {
                name: "DRAM".into(),
                reason: format!("clock scale {} must be at least 1.0", self.dram.clock_scale),
            });
        }
        Ok(())
    }
}

/// Run-level parameters: the already-resolved surface a command line would provide.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Instructions in the warmup phase; derived from the simulation length when absent.
    #[serde(default)]
    pub warmup_instructions: Option<u64>,

    /// Instructions in the measured phase; unbounded when absent.
    #[serde(default)]
    pub simulation_instructions: Option<u64>,

    /// One trace per simulated core.
    #[serde(default)]
    pub traces: Vec<PathBuf>,

    /// Trace that replaces every core's trace once warmup has ended.
    #[serde(default)]
    pub replacement_trace: Option<PathBuf>,

    /// Record layout of every trace in the run.
    #[serde(default)]
    pub trace_format: TraceFormat,

    /// Fetched instructions between snapshots in the measured phase (0 disables).
    #[serde(default = "RunConfig::default_snapshot_rate")]
    pub snapshot_rate: u64,

    /// Where snapshot files go. Required.
    #[serde(default)]
    pub snapshot_folder: Option<PathBuf>,

    /// Replay traces from the start when they end; defaults to "simulation length given".
    #[serde(default)]
    pub repeat_traces: Option<bool>,
}

impl RunConfig {
    fn default_snapshot_rate() -> u64 {
        defaults::SNAPSHOT_RATE
    }

    /// Resolved warmup length.
    ///
    /// An explicit value wins; otherwise 20% of an explicit simulation length; otherwise 0.
    pub fn warmup_length(&self) -> u64 {
        match (self.warmup_instructions, self.simulation_instructions) {
            (Some(warmup), _) => warmup,
            (None, Some(sim)) => {
                sim.saturating_mul(defaults::WARMUP_NUMERATOR) / defaults::WARMUP_DENOMINATOR
            }
            (None, None) => 0,
        }
    }

    /// Resolved measured-phase length (`u64::MAX` runs to the end of the trace).
    pub fn simulation_length(&self) -> u64 {
        self.simulation_instructions.unwrap_or(u64::MAX)
    }

    /// Whether traces replay from the start when they end.
    pub fn repeats(&self) -> bool {
        self.repeat_traces
            .unwrap_or(self.simulation_instructions.is_some())
    }

    /// Validates the run parameters and builds the `[Warmup, Simulation]` phase descriptors.
    pub fn phases(&self) -> Result<Vec<PhaseInfo>, ConfigError> {
        if self.snapshot_folder.is_none() {
            return Err(ConfigError::MissingSnapshotFolder);
        }
        if self.traces.is_empty() {
            return Err(ConfigError::NoTraces);
        }

        let trace_names: Vec<String> = self
            .traces
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        let trace_index: Vec<usize> = (0..self.traces.len()).collect();

        Ok(vec![
            PhaseInfo {
                name: "Warmup".into(),
                is_warmup: true,
                length: self.warmup_length(),
                trace_index: trace_index.clone(),
                trace_names: trace_names.clone(),
                snapshot_rate: 0,
            },
            PhaseInfo {
                name: "Simulation".into(),
                is_warmup: false,
                length: self.simulation_length(),
                trace_index,
                trace_names,
                snapshot_rate: self.snapshot_rate,
            },
        ])
    }

    /// Opens one reader per configured trace.
    pub fn open_traces(&self) -> Result<Vec<TraceReader>, TraceError> {
        let repeat = self.repeats();
        self.traces
            .iter()
            .map(|path| TraceReader::open(path, self.trace_format, repeat))
            .collect()
    }

    /// Opens the replacement trace, if one is configured. It never repeats.
    pub fn open_replacement(&self) -> Result<Option<TraceReader>, TraceError> {
        self.replacement_trace
            .as_ref()
            .map(|path| TraceReader::open(path, self.trace_format, false))
            .transpose()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            warmup_instructions: None,
            simulation_instructions: None,
            traces: Vec::new(),
            replacement_trace: None,
            trace_format: TraceFormat::default(),
            snapshot_rate: defaults::SNAPSHOT_RATE,
            snapshot_folder: None,
            repeat_traces: None,
        }
    }
}

/// Core (front end, window, retire) parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    /// Trace input queue capacity
    #[serde(default = "CoreConfig::default_in_queue")]
    pub in_queue_size: usize,

    /// Reorder buffer capacity
    #[serde(default = "CoreConfig::default_rob")]
    pub rob_size: usize,

    /// Instructions dispatched per cycle
    #[serde(default = "CoreConfig::default_fetch_width")]
    pub fetch_width: usize,

    /// Instructions retired per cycle
    #[serde(default = "CoreConfig::default_retire_width")]
    pub retire_width: usize,

    /// Execute latency of non-memory instructions
    #[serde(default = "CoreConfig::default_execute_latency")]
    pub execute_latency: u64,

    /// Fetch stall after a mispredicted branch
    #[serde(default = "CoreConfig::default_mispredict_penalty")]
    pub mispredict_penalty: u64,

    /// Branch predictor type
    #[serde(default)]
    pub branch_predictor: BranchPredictor,

    /// Bimodal / GShare counter table size
    #[serde(default = "CoreConfig::default_bimodal_size")]
    pub bimodal_table_size: usize,

    /// TAGE predictor configuration
    #[serde(default)]
    pub tage: TageConfig,

    /// Core cycles per tick of this component (1.0 = core clock)
    #[serde(default = "default_clock_scale")]
    pub clock_scale: f64,
}

impl CoreConfig {
    fn default_in_queue() -> usize {
        defaults::IN_QUEUE_SIZE
    }

    fn default_rob() -> usize {
        defaults::ROB_SIZE
    }

    fn default_fetch_width() -> usize {
        defaults::FETCH_WIDTH
    }

    fn default_retire_width() -> usize {
        defaults::RETIRE_WIDTH
    }

    fn default_execute_latency() -> u64 {
        defaults::EXECUTE_LATENCY
    }

    fn default_mispredict_penalty() -> u64 {
        defaults::MISPREDICT_PENALTY
    }

    fn default_bimodal_size() -> usize {
        defaults::BIMODAL_TABLE_SIZE
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.in_queue_size == 0
            || self.rob_size == 0
            || self.fetch_width == 0
            || self.retire_width == 0
        {
            return Err(ConfigError::InvalidCore(
                "input queue, ROB size, fetch width, and retire width must be non-zero".into(),
            ));
        }
        if !(self.clock_scale >= 1.0) {
            return Err(ConfigError::InvalidCore(format!(
                "clock scale {} must be at least 1.0",
                self.clock_scale
            )));
        }
        if !self.bimodal_table_size.is_power_of_two() {
            return Err(ConfigError::InvalidPredictor(format!(
                "counter table size {} is not a power of two",
                self.bimodal_table_size
            )));
        }
        if self.branch_predictor == BranchPredictor::Tage {
            self.tage.validate()?;
        }
        Ok(())
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            in_queue_size: defaults::IN_QUEUE_SIZE,
            rob_size: defaults::ROB_SIZE,
            fetch_width: defaults::FETCH_WIDTH,
            retire_width: defaults::RETIRE_WIDTH,
            execute_latency: defaults::EXECUTE_LATENCY,
            mispredict_penalty: defaults::MISPREDICT_PENALTY,
            branch_predictor: BranchPredictor::default(),
            bimodal_table_size: defaults::BIMODAL_TABLE_SIZE,
            tage: TageConfig::default(),
            clock_scale: 1.0,
        }
    }
}

const fn default_clock_scale() -> f64 {
    1.0
}

/// Cache hierarchy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheHierarchyConfig {
    /// L1 instruction cache
    #[serde(default = "CacheHierarchyConfig::default_l1_i")]
    pub l1_i: CacheConfig,
    /// L1 data cache
    #[serde(default = "CacheHierarchyConfig::default_l1_d")]
    pub l1_d: CacheConfig,
    /// Unified L2 cache
    #[serde(default = "CacheHierarchyConfig::default_l2")]
    pub l2: CacheConfig,
    /// Last-level cache
    #[serde(default = "CacheHierarchyConfig::default_llc")]
    pub llc: CacheConfig,
}

impl CacheHierarchyConfig {
    fn default_l1_i() -> CacheConfig {
        CacheConfig {
            prefetcher: Prefetcher::Fdip,
            ..CacheConfig::default()
        }
    }

    fn default_l1_d() -> CacheConfig {
        CacheConfig {
            ways: 12,
            mshr_size: 16,
            hit_latency: 5,
            prefetcher: Prefetcher::NextLine,
            ..CacheConfig::default()
        }
    }

    fn default_l2() -> CacheConfig {
        CacheConfig {
            sets: 1024,
            mshr_size: 32,
            hit_latency: 10,
            ..CacheConfig::default()
        }
    }

    fn default_llc() -> CacheConfig {
        CacheConfig {
            sets: 2048,
            ways: 16,
            mshr_size: 64,
            hit_latency: 20,
            ..CacheConfig::default()
        }
    }
}

impl Default for CacheHierarchyConfig {
    fn default() -> Self {
        Self {
            l1_i: Self::default_l1_i(),
            l1_d: Self::default_l1_d(),
            l2: Self::default_l2(),
            llc: Self::default_llc(),
        }
    }
}

/// Individual cache level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Number of sets (power of two)
    #[serde(default = "CacheConfig::default_sets")]
    pub sets: usize,

    /// Associativity (number of ways)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Outstanding-miss (MSHR) capacity
    #[serde(default = "CacheConfig::default_mshr")]
    pub mshr_size: usize,

    /// Internal prefetch queue capacity
    #[serde(default = "CacheConfig::default_pq")]
    pub pq_size: usize,

    /// Request queue capacity of each channel feeding this cache
    #[serde(default = "CacheConfig::default_channel_queue")]
    pub channel_queue_size: usize,

    /// Hit latency in cycles
    #[serde(default = "CacheConfig::default_latency")]
    pub hit_latency: u64,

    /// Tag lookups per cycle
    #[serde(default = "CacheConfig::default_tag_checks")]
    pub max_tag_check: usize,

    /// Replacement policy
    #[serde(default)]
    pub policy: ReplacementPolicy,

    /// Hardware prefetcher type
    #[serde(default)]
    pub prefetcher: Prefetcher,

    /// Prefetch degree (blocks per trigger)
    #[serde(default = "CacheConfig::default_prefetch_degree")]
    pub prefetch_degree: usize,

    /// Prefetcher table size (stride prefetcher)
    #[serde(default = "CacheConfig::default_prefetch_table")]
    pub prefetch_table_size: usize,

    /// Core cycles per tick of this cache
    #[serde(default = "default_clock_scale")]
    pub clock_scale: f64,
}

impl CacheConfig {
    fn default_sets() -> usize {
        defaults::CACHE_SETS
    }

    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    fn default_mshr() -> usize {
        defaults::CACHE_MSHR
    }

    fn default_pq() -> usize {
        defaults::CACHE_PQ
    }

    fn default_channel_queue() -> usize {
        defaults::CHANNEL_QUEUE_SIZE
    }

    fn default_latency() -> u64 {
        defaults::CACHE_LATENCY
    }

    fn default_tag_checks() -> usize {
        defaults::CACHE_TAG_CHECKS
    }

    fn default_prefetch_degree() -> usize {
        defaults::PREFETCH_DEGREE
    }

    fn default_prefetch_table() -> usize {
        defaults::PREFETCH_TABLE_SIZE
    }

    /// Checks the geometry of one cache level.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let reason = if self.sets == 0 || !self.sets.is_power_of_two() {
            Some(format!("{} sets is not a non-zero power of two", self.sets))
        } else if self.ways == 0 {
            Some("associativity must be non-zero".to_string())
        } else if self.mshr_size == 0 {
            Some("MSHR size must be non-zero".to_string())
        } else if self.max_tag_check == 0 || self.channel_queue_size == 0 {
            Some("tag bandwidth and channel queues must be non-zero".to_string())
        } else if !(self.clock_scale >= 1.0) {
            Some(format!("clock scale {} must be at least 1.0", self.clock_scale))
        } else {
            None
        };

        reason.map_or(Ok(()), |reason| {
            Err(ConfigError::InvalidCache {
                name: name.to_string(),
                reason,
            })
        })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sets: defaults::CACHE_SETS,
            ways: defaults::CACHE_WAYS,
            mshr_size: defaults::CACHE_MSHR,
            pq_size: defaults::CACHE_PQ,
            channel_queue_size: defaults::CHANNEL_QUEUE_SIZE,
            hit_latency: defaults::CACHE_LATENCY,
            max_tag_check: defaults::CACHE_TAG_CHECKS,
            policy: ReplacementPolicy::default(),
            prefetcher: Prefetcher::default(),
            prefetch_degree: defaults::PREFETCH_DEGREE,
            prefetch_table_size: defaults::PREFETCH_TABLE_SIZE,
            clock_scale: 1.0,
        }
    }
}

/// Main memory (single DRAM channel) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DramConfig {
    /// CAS latency (column access strobe)
    #[serde(default = "DramConfig::default_t_cas")]
    pub t_cas: u64,

    /// RAS latency (row access strobe)
    #[serde(default = "DramConfig::default_t_ras")]
    pub t_ras: u64,

    /// Precharge latency
    #[serde(default = "DramConfig::default_t_pre")]
    pub t_pre: u64,

    /// Row size in bytes
    #[serde(default = "DramConfig::default_row_bytes")]
    pub row_bytes: u64,

    /// Request queue capacity of the channel feeding DRAM
    #[serde(default = "DramConfig::default_rq")]
    pub rq_size: usize,

    /// Core cycles per DRAM cycle
    #[serde(default = "DramConfig::default_clock_scale")]
    pub clock_scale: f64,
}

impl DramConfig {
    fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    fn default_t_ras() -> u64 {
        defaults::T_RAS
    }

    fn default_t_pre() -> u64 {
        defaults::T_PRE
    }

    fn default_row_bytes() -> u64 {
        defaults::ROW_BYTES
    }

    fn default_rq() -> usize {
        defaults::CHANNEL_QUEUE_SIZE
    }

    fn default_clock_scale() -> f64 {
        defaults::DRAM_CLOCK_SCALE
    }
}

impl Default for DramConfig {
    fn default() -> Self {
        Self {
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
            row_bytes: defaults::ROW_BYTES,
            rq_size: defaults::CHANNEL_QUEUE_SIZE,
            clock_scale: defaults::DRAM_CLOCK_SCALE,
        }
    }
}

/// TAGE (Tagged Geometric) predictor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TageConfig {
    /// Number of tagged tables
    #[serde(default = "TageConfig::default_banks")]
    pub num_banks: usize,

    /// Entries per table
    #[serde(default = "TageConfig::default_table_size")]
    pub table_size: usize,

    /// Loop predictor table size
    #[serde(default = "TageConfig::default_loop_size")]
    pub loop_table_size: usize,

    /// Useful counter reset interval
    #[serde(default = "TageConfig::default_reset_interval")]
    pub reset_interval: u32,

    /// History lengths for each bank
    #[serde(default = "TageConfig::default_history_lengths")]
    pub history_lengths: Vec<usize>,

    /// Tag widths for each bank
    #[serde(default = "TageConfig::default_tag_widths")]
    pub tag_widths: Vec<usize>,
}

impl TageConfig {
    fn default_banks() -> usize {
        defaults::TAGE_BANKS
    }

    fn default_table_size() -> usize {
        defaults::TAGE_TABLE_SIZE
    }

    fn default_loop_size() -> usize {
        defaults::TAGE_LOOP_SIZE
    }

    fn default_reset_interval() -> u32 {
        defaults::TAGE_RESET_INTERVAL
    }

    /// Geometric progression of history lengths: [5, 15, 44, 130].
    fn default_history_lengths() -> Vec<usize> {
        vec![5, 15, 44, 130]
    }

    /// Tag widths increase with history length: [9, 9, 10, 10] bits.
    fn default_tag_widths() -> Vec<usize> {
        vec![9, 9, 10, 10]
    }

    /// Checks table sizes and per-bank vectors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.table_size.is_power_of_two() || !self.loop_table_size.is_power_of_two() {
            return Err(ConfigError::InvalidPredictor(
                "TAGE table sizes must be powers of two".into(),
            ));
        }
        if self.history_lengths.len() != self.num_banks || self.tag_widths.len() != self.num_banks
        {
            return Err(ConfigError::InvalidPredictor(format!(
                "TAGE has {} banks but {} history lengths and {} tag widths",
                self.num_banks,
                self.history_lengths.len(),
                self.tag_widths.len()
            )));
        }
        if self.tag_widths.iter().any(|&w| w == 0 || w > 16) {
            return Err(ConfigError::InvalidPredictor(
                "TAGE tag widths must be between 1 and 16 bits".into(),
            ));
        }
        Ok(())
    }
}

impl Default for TageConfig {
    fn default() -> Self {
        Self {
            num_banks: defaults::TAGE_BANKS,
            table_size: defaults::TAGE_TABLE_SIZE,
            loop_table_size: defaults::TAGE_LOOP_SIZE,
            reset_interval: defaults::TAGE_RESET_INTERVAL,
            history_lengths: Self::default_history_lengths(),
            tag_widths: Self::default_tag_widths(),
        }
    }
}
