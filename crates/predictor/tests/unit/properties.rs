//! # Protocol Properties
//!
//! Property-based checks of the speculative call contract: arbitrary outcome
//! sequences and resolution orders must never corrupt counters, leak
//! checkpoints, or leave foreign bits in the history register.

use proptest::prelude::*;
use specbp_core::config::{TageConfig, defaults};
use specbp_core::predictors::CondPredictor;
use specbp_core::predictors::tage::TagePredictor;

fn predictor() -> TagePredictor {
    let mut bp = TagePredictor::new(&TageConfig::default(), defaults::BUDGET_BYTES);
    bp.setup().unwrap();
    bp
}

/// Outcomes for `n` branches plus a permutation of their resolution order.
fn outcomes_and_order() -> impl Strategy<Value = (Vec<bool>, Vec<usize>)> {
    (1usize..=32).prop_flat_map(|n| {
        (
            prop::collection::vec(any::<bool>(), n),
            Just((0..n).collect::<Vec<usize>>()).prop_shuffle(),
        )
    })
}

proptest! {
    #[test]
    fn any_outcome_sequence_is_survivable(outcomes in prop::collection::vec(any::<bool>(), 0..200)) {
        let mut bp = predictor();
        for (seq, &taken) in outcomes.iter().enumerate() {
            let seq = seq as u64;
            let pred = bp.predict(seq, 0, 0x4000);
            bp.history_update(seq, 0, 0x4000, pred, 0x4100);
            bp.update(seq, 0, 0x4000, taken, pred, 0x4100);
        }
        prop_assert_eq!(bp.in_flight(), 0);
        prop_assert_eq!(bp.stats().resolutions, outcomes.len() as u64);
        prop_assert!(bp.stats().mispredictions <= bp.stats().resolutions);
        prop_assert!((0.0..=1.0).contains(&bp.stats().accuracy()));
    }

    #[test]
    fn out_of_order_resolution_settles_history_to_resolved_outcomes(
        (outcomes, order) in outcomes_and_order()
    ) {
        let mut bp = predictor();
        let n = outcomes.len();

        let mut preds = Vec::with_capacity(n);
        for seq in 0..n as u64 {
            let pc = 0x1000 + seq * 0x40;
            let pred = bp.predict(seq, 0, pc);
            bp.history_update(seq, 0, pc, pred, pc + 0x100);
            preds.push(pred);
        }
        prop_assert_eq!(bp.in_flight(), n);

        for &i in &order {
            let seq = i as u64;
            let pc = 0x1000 + seq * 0x40;
            bp.update(seq, 0, pc, outcomes[i], preds[i], pc + 0x100);
        }

        // Every checkpoint consumed; every branch's bit now holds its
        // resolved outcome, in push order, regardless of resolution order.
        prop_assert_eq!(bp.in_flight(), 0);
        prop_assert_eq!(bp.history().len(), n);
        for (i, &taken) in outcomes.iter().enumerate() {
            prop_assert_eq!(bp.history().nth_newest(n - 1 - i), Some(taken));
        }
    }

    #[test]
    fn identical_traces_agree(
        trace in prop::collection::vec((0u8..4, any::<bool>()), 0..150)
    ) {
        let run = |trace: &[(u8, bool)]| {
            let mut bp = predictor();
            let mut preds = Vec::with_capacity(trace.len());
            for (seq, &(slot, taken)) in trace.iter().enumerate() {
                let seq = seq as u64;
                let pc = 0x2000 + u64::from(slot) * 0x80;
                let pred = bp.predict(seq, 0, pc);
                bp.history_update(seq, 0, pc, pred, pc + 0x100);
                bp.update(seq, 0, pc, taken, pred, pc + 0x100);
                preds.push(pred);
            }
            preds
        };
        prop_assert_eq!(run(&trace), run(&trace));
    }
}
