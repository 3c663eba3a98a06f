//! Machine construction and the top-level `System` type.
//!
//! This module builds the complete machine from configuration. It performs:
//! 1. **Channel setup:** One bounded channel per link in the hierarchy.
//! 2. **Core:** A single trace-driven core attached to its L1 caches.
//! 3. **Caches:** L1I and L1D feeding a unified L2, which feeds the LLC.
//! 4. **Memory:** One DRAM channel below the LLC.

use crate::common::error::ConfigError;
use crate::config::Config;
use crate::core::Cpu;
use crate::core::units::cache::Cache;
use crate::sim::environment::{CoreModel, Environment};
use crate::sim::operable::Operable;
use crate::soc::channel::Channel;
use crate::soc::memory::DramChannel;
use crate::stats::{CacheStats, DramStats};

/// Index of the instruction cache in [`System::caches`].
pub const L1I: usize = 0;
/// Index of the data cache in [`System::caches`].
pub const L1D: usize = 1;
/// Index of the unified second-level cache in [`System::caches`].
pub const L2C: usize = 2;
/// Index of the last-level cache in [`System::caches`].
pub const LLC: usize = 3;

/// A complete single-core machine.
///
/// Operables are indexed core first, then caches from L1I to LLC, then DRAM.
#[derive(Debug)]
pub struct System {
    cpu: Cpu,
    caches: Vec<Cache>,
    dram: DramChannel,
}

impl System {
    /// Builds a machine from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulator configuration (core, caches, DRAM).
    ///
    /// # Returns
    ///
    /// A fully connected `System`, or the first configuration error found.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let caches = &config.cache;

        let core_to_l1i = Channel::shared(caches.l1_i.channel_queue_size);
        let core_to_l1d = Channel::shared(caches.l1_d.channel_queue_size);
        let l1i_to_l2 = Channel::shared(caches.l2.channel_queue_size);
        let l1d_to_l2 = Channel::shared(caches.l2.channel_queue_size);
        let l2_to_llc = Channel::shared(caches.llc.channel_queue_size);
        let llc_to_dram = Channel::shared(config.dram.rq_size);

        let cpu = Cpu::new(0, &config.core, core_to_l1i.clone(), core_to_l1d.clone())?;
        let caches = vec![
            Cache::new("cpu0_L1I", &caches.l1_i, vec![core_to_l1i], l1i_to_l2.clone()),
            Cache::new("cpu0_L1D", &caches.l1_d, vec![core_to_l1d], l1d_to_l2.clone()),
            Cache::new(
                "cpu0_L2C",
                &caches.l2,
                vec![l1i_to_l2, l1d_to_l2],
                l2_to_llc.clone(),
            ),
            Cache::new("LLC", &caches.llc, vec![l2_to_llc], llc_to_dram.clone()),
        ];
        let dram = DramChannel::new("DRAM", &config.dram, llc_to_dram);

        Ok(Self { cpu, caches, dram })
    }

    /// The core.
    pub const fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Caches from L1I to LLC; see [`L1I`], [`L1D`], [`L2C`], [`LLC`].
    pub fn caches(&self) -> &[Cache] {
        &self.caches
    }

    /// Mutable access to the caches, e.g. to pre-warm them.
    pub fn caches_mut(&mut self) -> &mut [Cache] {
        &mut self.caches
    }

    /// The DRAM channel.
    pub const fn dram(&self) -> &DramChannel {
        &self.dram
    }
}

impl Environment for System {
    fn operable_count(&self) -> usize {
        self.caches.len() + 2
    }

    fn operable(&self, index: usize) -> Option<&dyn Operable> {
        let dram = self.caches.len() + 1;
        match index {
            0 => Some(&self.cpu),
            i if i == dram => Some(&self.dram),
            i => self.caches.get(i - 1).map(|cache| cache as &dyn Operable),
        }
    }

    fn operable_mut(&mut self, index: usize) -> Option<&mut dyn Operable> {
        let dram = self.caches.len() + 1;
        match index {
            0 => Some(&mut self.cpu),
            i if i == dram => Some(&mut self.dram),
            i => self
                .caches
                .get_mut(i - 1)
                .map(|cache| cache as &mut dyn Operable),
        }
    }

    fn core_count(&self) -> usize {
        1
    }

    fn core(&self, cpu: usize) -> Option<&dyn CoreModel> {
        (cpu == 0).then_some(&self.cpu as &dyn CoreModel)
    }

    fn core_mut(&mut self, cpu: usize) -> Option<&mut dyn CoreModel> {
        (cpu == 0).then_some(&mut self.cpu as &mut dyn CoreModel)
    }

    fn cache_stats(&self) -> Vec<CacheStats> {
        self.caches.iter().map(|c| c.sim_stats().clone()).collect()
    }

    fn roi_cache_stats(&self) -> Vec<CacheStats> {
        self.caches.iter().map(|c| c.roi_stats().clone()).collect()
    }

    fn dram_stats(&self) -> Vec<DramStats> {
        vec![self.dram.sim_stats().clone()]
    }

    fn roi_dram_stats(&self) -> Vec<DramStats> {
        vec![self.dram.roi_stats().clone()]
    }
}
