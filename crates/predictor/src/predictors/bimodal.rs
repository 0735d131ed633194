//! Bimodal predictor: a flat table of 2-bit saturating counters.
//!
//! Each PC maps (modulo table size) to one counter; collisions between
//! different branches are accepted and not disambiguated. The predictor keeps
//! no speculative state, so `history_update` is a no-op and resolution order
//! never matters.

use super::CondPredictor;
use crate::common::{InstId, SetupError};
use crate::config::BimodalConfig;
use crate::stats::PredictorStats;

/// Largest 2-bit counter value (strongly taken).
const CTR_MAX: u8 = 3;
/// Taken threshold; counters at or above it predict taken.
const TAKEN_AT: u8 = 2;
/// Cold-start fill: weakly not-taken.
const CTR_COLD: u8 = 1;

/// Bimodal predictor structure.
#[derive(Debug)]
pub struct BimodalPredictor {
    /// Counter table, indexed by PC modulo its length.
    table: Vec<u8>,
    /// Counters accumulated since the last `setup()`.
    stats: PredictorStats,
}

impl BimodalPredictor {
    /// Creates a bimodal predictor with `2^index_bits` counters.
    pub fn new(config: &BimodalConfig) -> Self {
        Self {
            table: vec![CTR_COLD; 1 << config.index_bits],
            stats: PredictorStats::default(),
        }
    }

    /// Index into the counter table for `pc`.
    fn index(&self, pc: u64) -> usize {
        (pc as usize) % self.table.len()
    }
}

impl CondPredictor for BimodalPredictor {
    fn setup(&mut self) -> Result<(), SetupError> {
        self.table.fill(CTR_COLD);
        self.stats.reset();
        Ok(())
    }

    /// Predicts taken when the counter's upper half is reached.
    fn predict(&mut self, seq_no: u64, piece: u8, pc: u64) -> bool {
        let _ = InstId::new(seq_no, piece);
        self.stats.predictions += 1;
        self.table[self.index(pc)] >= TAKEN_AT
    }

    /// No speculative state to maintain.
    fn history_update(
        &mut self,
        _seq_no: u64,
        _piece: u8,
        _pc: u64,
        _pred_taken: bool,
        _next_pc: u64,
    ) {
    }

    /// Saturates the branch's counter toward the resolved direction.
    fn update(
        &mut self,
        _seq_no: u64,
        _piece: u8,
        pc: u64,
        resolved_taken: bool,
        pred_taken: bool,
        _next_pc: u64,
    ) {
        let idx = self.index(pc);
        let ctr = &mut self.table[idx];
        if resolved_taken {
            *ctr = (*ctr + 1).min(CTR_MAX);
        } else {
            *ctr = ctr.saturating_sub(1);
        }

        self.stats.resolutions += 1;
        if resolved_taken != pred_taken {
            self.stats.mispredictions += 1;
        }
    }

    fn terminate(&mut self) {
        self.table.fill(CTR_COLD);
    }

    fn stats(&self) -> &PredictorStats {
        &self.stats
    }
}
