//! TAGE (Tagged Geometric History Length) Branch Predictor.
//!
//! A bimodal base table backed by tagged banks, each indexed with a longer slice of
//! global history than the last. The longest matching bank provides the direction and
//! the next match is kept as the alternate. On top of that, a small loop predictor
//! overrides the result once it has seen the same trip count repeat.

use super::BranchPredictor;
use crate::common::error::ConfigError;
use crate::config::TageConfig;
use crate::trace::BranchKind;

/// Bounds of the 3-bit signed counter in tagged entries.
const CTR_MIN: i8 = -4;
const CTR_MAX: i8 = 3;
/// Bounds of the 2-bit signed counter in the base table.
const BASE_MIN: i8 = -2;
const BASE_MAX: i8 = 1;
const USEFUL_MAX: u8 = 3;
/// Confidence at which a loop entry starts overriding the banks.
const LOOP_CONFIDENT: u8 = 3;

/// Steps a signed saturating counter towards the outcome.
const fn saturate(ctr: i8, taken: bool, min: i8, max: i8) -> i8 {
    if taken {
        if ctr < max { ctr + 1 } else { ctr }
    } else if ctr > min {
        ctr - 1
    } else {
        ctr
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct TaggedEntry {
    /// Set once the entry is allocated; a zero tag alone does not mean a match.
    valid: bool,
    tag: u16,
    ctr: i8,
    useful: u8,
}

/// Table slot a direction was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Bank { bank: usize, slot: usize },
    Base(usize),
}

/// Provider and alternate for one branch address.
#[derive(Debug, Clone, Copy)]
struct Lookup {
    provider: Source,
    alternate: Source,
}

#[derive(Debug, Clone, Copy, Default)]
struct LoopEntry {
    valid: bool,
    tag: u16,
    confidence: u8,
    iteration: u16,
    trip_count: u16,
    age: u8,
    direction: bool,
}

/// Learns fixed trip counts and predicts the exit iteration.
#[derive(Debug, Clone)]
struct LoopPredictor {
    entries: Vec<LoopEntry>,
    mask: usize,
}

impl LoopPredictor {
    fn new(size: usize) -> Self {
        Self {
            entries: vec![LoopEntry::default(); size],
            mask: size - 1,
        }
    }

    const fn slot_and_tag(&self, ip: u64) -> (usize, u16) {
        ((ip as usize) & self.mask, ((ip >> 8) & 0xFFFF) as u16)
    }

    fn predict(&self, ip: u64) -> Option<bool> {
        let (slot, tag) = self.slot_and_tag(ip);
        let entry = &self.entries[slot];
        (entry.valid && entry.tag == tag && entry.confidence == LOOP_CONFIDENT)
            .then_some((entry.iteration < entry.trip_count) == entry.direction)
    }

    fn train(&mut self, ip: u64, taken: bool) {
        let (slot, tag) = self.slot_and_tag(ip);
        let entry = &mut self.entries[slot];

        if !entry.valid || entry.tag != tag {
            // Another branch holds the slot; it is replaced only once its age runs out.
            if entry.age == 0 {
                *entry = LoopEntry {
                    valid: true,
                    tag,
                    age: u8::MAX,
                    direction: taken,
                    ..LoopEntry::default()
                };
            } else {
                entry.age -= 1;
            }
            return;
        }

        entry.age = entry.age.saturating_add(1);
        if taken == entry.direction {
            entry.iteration = entry.iteration.saturating_add(1);
            return;
        }

        if entry.iteration == entry.trip_count {
            entry.confidence = (entry.confidence + 1).min(LOOP_CONFIDENT);
        } else {
            entry.trip_count = entry.iteration;
            entry.confidence = 0;
            entry.age = 0;
        }
        entry.iteration = 0;
    }
}

/// TAGE direction predictor.
#[derive(Debug, Clone)]
pub struct TagePredictor {
    /// Global direction history, newest outcome in bit 0.
    ghr: u64,
    /// Path history built from branch address bits.
    phr: u64,
    base: Vec<i8>,
    banks: Vec<Vec<TaggedEntry>>,
    history_lengths: Vec<usize>,
    tag_widths: Vec<usize>,
    table_mask: usize,
    loops: LoopPredictor,
    updates_since_decay: u32,
    /// Updates between halvings of every useful counter.
    decay_interval: u32,
}

impl TagePredictor {
    /// Creates a TAGE predictor with the configured geometry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPredictor` if the table sizes are not powers
    /// of two or the per-bank vectors do not match the bank count.
    pub fn new(config: &TageConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            ghr: 0,
            phr: 0,
            base: vec![0; config.table_size],
            banks: vec![vec![TaggedEntry::default(); config.table_size]; config.num_banks],
            history_lengths: config.history_lengths.clone(),
            tag_widths: config.tag_widths.clone(),
            table_mask: config.table_size - 1,
            loops: LoopPredictor::new(config.loop_table_size),
            updates_since_decay: 0,
            decay_interval: config.reset_interval,
        })
    }

    const fn history_mask(len: usize) -> u64 {
        if len >= 64 { u64::MAX } else { (1u64 << len) - 1 }
    }

    fn slot(&self, ip: u64, bank: usize) -> usize {
        let mask = Self::history_mask(self.history_lengths[bank]);
        let hashed = ip ^ (self.ghr & mask) ^ ((self.phr & mask) << 1);
        (hashed as usize) & self.table_mask
    }

    fn tag(&self, ip: u64, bank: usize) -> u16 {
        let mask = Self::history_mask(self.history_lengths[bank]);
        let width = self.tag_widths[bank];
        let hashed = ip ^ ((self.ghr & mask) >> 3);
        ((hashed as u32) & ((1u32 << width) - 1)) as u16
    }

    const fn base_slot(&self, ip: u64) -> usize {
        (ip as usize) & self.table_mask
    }

    /// Finds the two longest-history banks whose tag matches, falling back to the base table.
    fn lookup(&self, ip: u64) -> Lookup {
        let base = Source::Base(self.base_slot(ip));
        let mut hits = (0..self.banks.len()).rev().filter_map(|bank| {
            let slot = self.slot(ip, bank);
            let entry = &self.banks[bank][slot];
            (entry.valid && entry.tag == self.tag(ip, bank)).then_some(Source::Bank { bank, slot })
        });
        let provider = hits.next().unwrap_or(base);
        let alternate = hits.next().unwrap_or(base);
        Lookup {
            provider,
            alternate,
        }
    }

    fn direction(&self, source: Source) -> bool {
        match source {
            Source::Bank { bank, slot } => self.banks[bank][slot].ctr >= 0,
            Source::Base(slot) => self.base[slot] >= 0,
        }
    }

    fn decay_useful(&mut self) {
        self.updates_since_decay += 1;
        if self.updates_since_decay < self.decay_interval {
            return;
        }
        self.updates_since_decay = 0;
        self.banks
            .iter_mut()
            .flatten()
            .for_each(|entry| entry.useful >>= 1);
    }

    /// Claims the first non-useful slot at or above `from_bank`, or ages every candidate.
    fn allocate(&mut self, ip: u64, from_bank: usize, taken: bool) {
        let free = (from_bank..self.banks.len())
            .map(|bank| (bank, self.slot(ip, bank)))
            .find(|&(bank, slot)| self.banks[bank][slot].useful == 0);

        if let Some((bank, slot)) = free {
            self.banks[bank][slot] = TaggedEntry {
                valid: true,
                tag: self.tag(ip, bank),
                ctr: if taken { 0 } else { -1 },
                useful: 1,
            };
            return;
        }

        for bank in from_bank..self.banks.len() {
            let slot = self.slot(ip, bank);
            let entry = &mut self.banks[bank][slot];
            entry.useful = entry.useful.saturating_sub(1);
        }
    }
}

impl BranchPredictor for TagePredictor {
    fn predict(&self, ip: u64) -> bool {
        self.loops
            .predict(ip)
            .unwrap_or_else(|| self.direction(self.lookup(ip).provider))
    }

    fn update(&mut self, ip: u64, taken: bool, _predicted: bool, _target: u64, _kind: BranchKind) {
        self.decay_useful();

        let Lookup {
            provider,
            alternate,
        } = self.lookup(ip);
        let mispredicted = self.direction(provider) != taken;
        let alternate_correct = self.direction(alternate) == taken;

        self.loops.train(ip, taken);

        match provider {
            Source::Bank { bank, slot } => {
                let entry = &mut self.banks[bank][slot];
                entry.ctr = saturate(entry.ctr, taken, CTR_MIN, CTR_MAX);
                if !mispredicted && !alternate_correct {
                    entry.useful = (entry.useful + 1).min(USEFUL_MAX);
                }
            }
            Source::Base(slot) => {
                self.base[slot] = saturate(self.base[slot], taken, BASE_MIN, BASE_MAX);
            }
        }

        if mispredicted {
            let from_bank = match provider {
                Source::Bank { bank, .. } => bank + 1,
                Source::Base(_) => 0,
            };
            self.allocate(ip, from_bank, taken);
        }

        self.ghr = (self.ghr << 1) | u64::from(taken);
        self.phr = (self.phr << 1) | (ip & 1);
    }
}
