//! Two-level adaptive predictor (per-address history).
//!
//! The first level maps each branch PC to a k-bit history register of its own
//! recent outcomes; the second level is a shared pattern table of 2-bit
//! saturating counters, grouped into sets by PC so unrelated branches with
//! the same local pattern do not always collide.
//!
//! Histories advance speculatively at `history_update` time, so each
//! prediction checkpoints the history it actually used; resolution trains the
//! pattern entry selected by that checkpointed history, then discards the
//! checkpoint.

use std::collections::HashMap;

use super::CondPredictor;
use crate::common::{InstId, SetupError};
use crate::config::TwoLevelConfig;
use crate::stats::PredictorStats;

/// Largest 2-bit counter value (strongly taken).
const CTR_MAX: u8 = 3;
/// Taken threshold; counters at or above it predict taken.
const TAKEN_AT: u8 = 2;
/// Cold-start fill: weakly not-taken.
const CTR_COLD: u8 = 1;

/// Two-level adaptive predictor structure.
#[derive(Debug)]
pub struct TwoLevelPredictor {
    /// Pattern table geometry.
    cfg: TwoLevelConfig,
    /// Pattern table: `sets * 2^history_bits` saturating counters.
    pattern: Vec<u8>,
    /// First-level history register per branch PC.
    histories: HashMap<u64, u32>,
    /// History value used by each in-flight prediction.
    checkpoints: HashMap<InstId, u32>,
    /// Mask selecting the low `history_bits` of a history register.
    history_mask: u32,
    /// Entries per set (`2^history_bits`).
    set_entries: usize,
    /// Counters accumulated since the last `setup()`.
    stats: PredictorStats,
}

impl TwoLevelPredictor {
    /// Creates a two-level predictor from its configuration.
    ///
    /// The pattern table is not allocated until `setup()` validates the
    /// geometry.
    pub fn new(config: &TwoLevelConfig) -> Self {
        Self {
            cfg: *config,
            pattern: Vec::new(),
            histories: HashMap::new(),
            checkpoints: HashMap::new(),
            history_mask: 0,
            set_entries: 0,
            stats: PredictorStats::default(),
        }
    }

    /// Pattern table index for `pc` under history value `history`.
    fn pattern_index(&self, pc: u64, history: u32) -> usize {
        let set = (pc as usize) % self.cfg.sets;
        set * self.set_entries + (history & self.history_mask) as usize
    }
}

impl CondPredictor for TwoLevelPredictor {
    /// Validates the pattern table geometry, then allocates and resets all
    /// state to cold-start values.
    fn setup(&mut self) -> Result<(), SetupError> {
        self.cfg.validate()?;
        self.set_entries = 1usize << self.cfg.history_bits;
        self.history_mask = (1u32 << self.cfg.history_bits) - 1;
        self.pattern = vec![CTR_COLD; self.cfg.sets * self.set_entries];
        self.histories.clear();
        self.checkpoints.clear();
        self.stats.reset();
        Ok(())
    }

    /// Reads the counter selected by the branch's current history and
    /// checkpoints that history under the instruction identity.
    fn predict(&mut self, seq_no: u64, piece: u8, pc: u64) -> bool {
        let id = InstId::new(seq_no, piece);
        let history = self.histories.get(&pc).copied().unwrap_or(0);
        let taken = self.pattern[self.pattern_index(pc, history)] >= TAKEN_AT;

        let previous = self.checkpoints.insert(id, history);
        assert!(
            previous.is_none(),
            "duplicate predict for in-flight instruction ({id})"
        );

        self.stats.predictions += 1;
        taken
    }

    /// Shifts the predicted outcome into the branch's history register.
    fn history_update(&mut self, seq_no: u64, piece: u8, pc: u64, pred_taken: bool, _next_pc: u64) {
        let id = InstId::new(seq_no, piece);
        assert!(
            self.checkpoints.contains_key(&id),
            "history_update without a live prediction ({id})"
        );
        let history = self.histories.entry(pc).or_insert(0);
        *history = ((*history << 1) | u32::from(pred_taken)) & self.history_mask;
    }

    /// Trains the pattern entry selected by the checkpointed history.
    fn update(
        &mut self,
        seq_no: u64,
        piece: u8,
        pc: u64,
        resolved_taken: bool,
        pred_taken: bool,
        _next_pc: u64,
    ) {
        let id = InstId::new(seq_no, piece);
        let Some(history) = self.checkpoints.remove(&id) else {
            panic!("update without a live prediction ({id})");
        };

        let idx = self.pattern_index(pc, history);
        let ctr = &mut self.pattern[idx];
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
        self.pattern = Vec::new();
        self.histories.clear();
        self.checkpoints.clear();
    }

    fn stats(&self) -> &PredictorStats {
        &self.stats
    }
}
