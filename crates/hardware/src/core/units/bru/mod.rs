//! Branch prediction unit (BRU) implementations.
//!
//! This module contains the direction predictors the trace-driven core can use:
//! bimodal, gshare, and TAGE. The core holds a [`BranchPredictorWrapper`] built
//! from the configuration.

pub use self::branch_predictor::BranchPredictor;

/// Bimodal (per-address 2-bit counter) predictor.
pub mod bimodal;

/// Branch predictor trait.
pub mod branch_predictor;

/// Global history branch predictor (gshare algorithm).
pub mod gshare;

/// Tagged Geometric History Length branch predictor.
pub mod tage;

use self::{bimodal::BimodalPredictor, gshare::GSharePredictor, tage::TagePredictor};
use crate::common::error::ConfigError;
use crate::config::{BranchPredictor as BpType, CoreConfig};
use crate::trace::BranchKind;

/// Enum wrapper for static dispatch of Branch Predictors.
/// This avoids vtable lookups in the per-branch path.
#[derive(Debug, Clone)]
pub enum BranchPredictorWrapper {
    /// Bimodal predictor.
    Bimodal(BimodalPredictor),
    /// GShare predictor.
    GShare(GSharePredictor),
    /// TAGE predictor.
    Tage(Box<TagePredictor>),
}

impl BranchPredictorWrapper {
    /// Creates the predictor selected by the core configuration.
    pub fn new(config: &CoreConfig) -> Result<Self, ConfigError> {
        Ok(match config.branch_predictor {
            BpType::Bimodal => Self::Bimodal(BimodalPredictor::new(config.bimodal_table_size)),
            BpType::GShare => Self::GShare(GSharePredictor::new(config.bimodal_table_size)),
            BpType::Tage => Self::Tage(Box::new(TagePredictor::new(&config.tage)?)),
        })
    }
}

impl BranchPredictor for BranchPredictorWrapper {
    #[inline]
    fn predict(&self, ip: u64) -> bool {
        match self {
            Self::Bimodal(bp) => bp.predict(ip),
            Self::GShare(bp) => bp.predict(ip),
            Self::Tage(bp) => bp.predict(ip),
        }
    }

    #[inline]
    fn update(&mut self, ip: u64, taken: bool, predicted: bool, target: u64, kind: BranchKind) {
        match self {
            Self::Bimodal(bp) => bp.update(ip, taken, predicted, target, kind),
            Self::GShare(bp) => bp.update(ip, taken, predicted, target, kind),
            Self::Tage(bp) => bp.update(ip, taken, predicted, target, kind),
        }
    }
}
