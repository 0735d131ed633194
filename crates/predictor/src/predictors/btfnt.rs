//! Backward-taken / forward-not-taken predictor.
//!
//! Loops branch backwards, so a branch whose learned target lies at or before
//! its own PC is predicted taken; forward branches are predicted not-taken.
//! Targets are learned from the `next_pc` observed when a branch goes taken.
//! An unseen branch is assumed forward (fall-through).

use std::collections::HashMap;

use super::CondPredictor;
use crate::common::{InstId, SetupError};
use crate::stats::PredictorStats;

/// Backward-taken / forward-not-taken predictor structure.
#[derive(Debug, Default)]
pub struct BtFntPredictor {
    /// Last observed taken target per branch PC.
    targets: HashMap<u64, u64>,
    /// Counters accumulated since the last `setup()`.
    stats: PredictorStats,
}

impl BtFntPredictor {
    /// Creates an empty predictor.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CondPredictor for BtFntPredictor {
    fn setup(&mut self) -> Result<(), SetupError> {
        self.targets.clear();
        self.stats.reset();
        Ok(())
    }

    /// Predicts taken iff the last learned target is backward.
    fn predict(&mut self, seq_no: u64, piece: u8, pc: u64) -> bool {
        let _ = InstId::new(seq_no, piece);
        self.stats.predictions += 1;
        let target = self.targets.get(&pc).copied().unwrap_or(pc.wrapping_add(4));
        pc >= target
    }

    /// Learns the speculative target of a predicted-taken branch.
    fn history_update(
        &mut self,
        _seq_no: u64,
        _piece: u8,
        pc: u64,
        pred_taken: bool,
        next_pc: u64,
    ) {
        if pred_taken {
            let _ = self.targets.insert(pc, next_pc);
        }
    }

    /// Learns the resolved target of a taken branch.
    fn update(
        &mut self,
        _seq_no: u64,
        _piece: u8,
        pc: u64,
        resolved_taken: bool,
        pred_taken: bool,
        next_pc: u64,
    ) {
        if resolved_taken {
            let _ = self.targets.insert(pc, next_pc);
        }

        self.stats.resolutions += 1;
        if resolved_taken != pred_taken {
            self.stats.mispredictions += 1;
        }
    }

    fn terminate(&mut self) {
        self.targets.clear();
    }

    fn stats(&self) -> &PredictorStats {
        &self.stats
    }
}
