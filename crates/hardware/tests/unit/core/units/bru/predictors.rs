//! Branch Predictor Direction Tests.
//!
//! Verifies predict/update semantics for the bimodal, GShare, and TAGE
//! predictors, and predictor selection from the core configuration.

use rstest::rstest;
use tracesim_core::config::{BranchPredictor as BpType, CoreConfig, TageConfig};
use tracesim_core::core::units::bru::bimodal::BimodalPredictor;
use tracesim_core::core::units::bru::gshare::GSharePredictor;
use tracesim_core::core::units::bru::tage::TagePredictor;
use tracesim_core::core::units::bru::{BranchPredictor, BranchPredictorWrapper};
use tracesim_core::trace::BranchKind;
use tracesim_core::ConfigError;

const IP: u64 = 0x40_1234;

fn train(bp: &mut dyn BranchPredictor, ip: u64, taken: bool, times: usize) {
    for _ in 0..times {
        let predicted = bp.predict(ip);
        bp.update(ip, taken, predicted, ip + 0x40, BranchKind::Conditional);
    }
}

// ══════════════════════════════════════════════════════════
// 1. Bimodal
// ══════════════════════════════════════════════════════════

#[test]
fn bimodal_starts_weakly_not_taken() {
    let bp = BimodalPredictor::new(1024);
    assert!(!bp.predict(IP));
}

#[test]
fn bimodal_flips_after_one_taken() {
    let mut bp = BimodalPredictor::new(1024);
    train(&mut bp, IP, true, 1);
    assert!(bp.predict(IP));
}

#[test]
fn bimodal_saturates() {
    let mut bp = BimodalPredictor::new(1024);
    train(&mut bp, IP, true, 10);
    train(&mut bp, IP, false, 1);
    assert!(bp.predict(IP), "one not-taken must not undo a saturated counter");
    train(&mut bp, IP, false, 1);
    assert!(!bp.predict(IP));
}

#[test]
fn bimodal_keeps_branches_apart() {
    let mut bp = BimodalPredictor::new(1024);
    train(&mut bp, IP, true, 4);
    assert!(!bp.predict(IP + 4));
}

// ══════════════════════════════════════════════════════════
// 2. GShare
// ══════════════════════════════════════════════════════════

#[test]
fn gshare_learns_always_taken() {
    let mut bp = GSharePredictor::new(4096);
    train(&mut bp, IP, true, 64);
    assert!(bp.predict(IP));
}

#[test]
fn gshare_learns_always_not_taken() {
    let mut bp = GSharePredictor::new(4096);
    train(&mut bp, IP, false, 64);
    assert!(!bp.predict(IP));
}

#[test]
fn gshare_learns_alternating_pattern() {
    let mut bp = GSharePredictor::new(4096);
    for i in 0..200 {
        let taken = i % 2 == 0;
        let predicted = bp.predict(IP);
        bp.update(IP, taken, predicted, IP + 0x40, BranchKind::Conditional);
    }

    let mut correct = 0;
    for i in 200..240 {
        let taken = i % 2 == 0;
        let predicted = bp.predict(IP);
        if predicted == taken {
            correct += 1;
        }
        bp.update(IP, taken, predicted, IP + 0x40, BranchKind::Conditional);
    }
    assert_eq!(correct, 40, "history should disambiguate the two outcomes");
}

// ══════════════════════════════════════════════════════════
// 3. TAGE
// ══════════════════════════════════════════════════════════

#[test]
fn tage_learns_always_taken() {
    let mut bp = TagePredictor::new(&TageConfig::default()).unwrap();
    train(&mut bp, IP, true, 200);
    assert!(bp.predict(IP));
}

#[test]
fn tage_learns_always_not_taken() {
    let mut bp = TagePredictor::new(&TageConfig::default()).unwrap();
    train(&mut bp, IP, false, 200);
    assert!(!bp.predict(IP));
}

#[test]
fn tage_rejects_mismatched_banks() {
    let config = TageConfig {
        num_banks: 3,
        ..TageConfig::default()
    };
    assert!(matches!(
        TagePredictor::new(&config),
        Err(ConfigError::InvalidPredictor(_))
    ));
}

#[test]
fn tage_rejects_non_power_of_two_tables() {
    let config = TageConfig {
        table_size: 1000,
        ..TageConfig::default()
    };
    assert!(TagePredictor::new(&config).is_err());
}

// ══════════════════════════════════════════════════════════
// 4. Selection
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(BpType::Bimodal)]
#[case(BpType::GShare)]
#[case(BpType::Tage)]
fn configured_predictor_learns_a_biased_branch(#[case] kind: BpType) {
    let config = CoreConfig {
        branch_predictor: kind,
        bimodal_table_size: 1024,
        ..CoreConfig::default()
    };
    let mut bp = BranchPredictorWrapper::new(&config).unwrap();
    match (&bp, kind) {
        (BranchPredictorWrapper::Bimodal(_), BpType::Bimodal)
        | (BranchPredictorWrapper::GShare(_), BpType::GShare)
        | (BranchPredictorWrapper::Tage(_), BpType::Tage) => {}
        (other, _) => panic!("{kind:?} built {other:?}"),
    }

    train(&mut bp, IP, true, 200);
    assert!(bp.predict(IP));
}
