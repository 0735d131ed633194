//! Perceptron predictor over global history.
//!
//! Each table row is a signed weight vector (bias first); the prediction is
//! the sign of the dot product between the weights and the global history
//! bits mapped to ±1. Rows train only when the prediction was wrong or the
//! output magnitude fell below a confidence threshold, which keeps
//! well-separated branches stable.
//!
//! Global history advances speculatively, so every prediction snapshots the
//! register; on a misprediction the resolution rolls the register back to the
//! snapshot and replays the true outcome before training.

use std::collections::HashMap;

use tracing::debug;

use super::CondPredictor;
use crate::common::{InstId, SetupError};
use crate::config::PerceptronConfig;
use crate::stats::PredictorStats;

/// Largest representable weight.
const WEIGHT_MAX: i16 = i8::MAX as i16;
/// Smallest representable weight.
const WEIGHT_MIN: i16 = i8::MIN as i16;
/// Weight adjustment per training step.
const LEARNING_RATE: i16 = 1;

/// Perceptron predictor structure.
#[derive(Debug)]
pub struct PerceptronPredictor {
    /// Weight table geometry and training threshold.
    cfg: PerceptronConfig,
    /// Flattened weight rows; each row is `history_length + 1` weights with
    /// the bias first.
    weights: Vec<i8>,
    /// Global history register, newest outcome in bit 0.
    ghr: u64,
    /// Snapshot of the register taken by each in-flight prediction.
    snapshots: HashMap<InstId, u64>,
    /// Mask for indexing the row table.
    table_mask: usize,
    /// Weights per row (history length + bias).
    row_size: usize,
    /// Byte budget enforced at `setup()`.
    budget_bytes: usize,
    /// Counters accumulated since the last `setup()`.
    stats: PredictorStats,
}

impl PerceptronPredictor {
    /// Creates a perceptron predictor from its configuration.
    ///
    /// The weight table is not allocated until `setup()` validates the
    /// geometry and the budget.
    pub fn new(config: &PerceptronConfig, budget_bytes: usize) -> Self {
        Self {
            cfg: *config,
            weights: Vec::new(),
            ghr: 0,
            snapshots: HashMap::new(),
            table_mask: 0,
            row_size: 0,
            budget_bytes,
            stats: PredictorStats::default(),
        }
    }

    /// Row index for `pc`.
    fn row(&self, pc: u64) -> usize {
        (pc as usize) & self.table_mask
    }

    /// Dot product of a row's weights with history bits mapped to ±1.
    fn output(&self, row: usize, ghr: u64) -> i32 {
        let base = row * self.row_size;
        let mut y = i32::from(self.weights[base]);
        for i in 0..self.cfg.history_length {
            let signal = if (ghr >> i) & 1 != 0 { 1 } else { -1 };
            y += i32::from(self.weights[base + 1 + i]) * signal;
        }
        y
    }

    /// Trains a row toward `resolved_taken` under the given history.
    fn train(&mut self, row: usize, ghr: u64, resolved_taken: bool) {
        let target: i16 = if resolved_taken { 1 } else { -1 };
        let base = row * self.row_size;

        let bias = &mut self.weights[base];
        *bias = (i16::from(*bias) + LEARNING_RATE * target).clamp(WEIGHT_MIN, WEIGHT_MAX) as i8;

        for i in 0..self.cfg.history_length {
            let signal: i16 = if (ghr >> i) & 1 != 0 { 1 } else { -1 };
            let w = &mut self.weights[base + 1 + i];
            *w = (i16::from(*w) + LEARNING_RATE * target * signal).clamp(WEIGHT_MIN, WEIGHT_MAX)
                as i8;
        }
    }
}

impl CondPredictor for PerceptronPredictor {
    /// Validates the weight table geometry and byte budget, then allocates
    /// zeroed weights and clears history and snapshots.
    fn setup(&mut self) -> Result<(), SetupError> {
        self.cfg.validate()?;
        let required = self.cfg.storage_bytes();
        if required > self.budget_bytes {
            return Err(SetupError::BudgetExceeded {
                required,
                budget: self.budget_bytes,
            });
        }
        debug!(
            required,
            budget = self.budget_bytes,
            "perceptron predictor storage within budget"
        );

        let entries = self.cfg.entries();
        self.row_size = self.cfg.history_length + 1;
        self.table_mask = entries - 1;
        self.weights = vec![0; entries * self.row_size];
        self.ghr = 0;
        self.snapshots.clear();
        self.stats.reset();
        Ok(())
    }

    /// Computes the row output and snapshots the history register.
    fn predict(&mut self, seq_no: u64, piece: u8, pc: u64) -> bool {
        let id = InstId::new(seq_no, piece);
        let taken = self.output(self.row(pc), self.ghr) >= 0;

        let previous = self.snapshots.insert(id, self.ghr);
        assert!(
            previous.is_none(),
            "duplicate predict for in-flight instruction ({id})"
        );

        self.stats.predictions += 1;
        taken
    }

    /// Shifts the predicted outcome into the global history register.
    fn history_update(
        &mut self,
        seq_no: u64,
        piece: u8,
        _pc: u64,
        pred_taken: bool,
        _next_pc: u64,
    ) {
        let id = InstId::new(seq_no, piece);
        assert!(
            self.snapshots.contains_key(&id),
            "history_update without a live prediction ({id})"
        );
        self.ghr = (self.ghr << 1) | u64::from(pred_taken);
    }

    /// Rolls history back on a misprediction, replays the true outcome, and
    /// trains the row when wrong or under-confident.
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
        let Some(snapshot) = self.snapshots.remove(&id) else {
            panic!("update without a live prediction ({id})");
        };

        if resolved_taken != pred_taken {
            self.ghr = (snapshot << 1) | u64::from(resolved_taken);
        }

        let row = self.row(pc);
        let y = self.output(row, self.ghr);
        if (y >= 0) != resolved_taken || y.abs() <= self.cfg.theta {
            self.train(row, self.ghr, resolved_taken);
        }

        self.stats.resolutions += 1;
        if resolved_taken != pred_taken {
            self.stats.mispredictions += 1;
        }
    }

    fn terminate(&mut self) {
        self.weights = Vec::new();
        self.ghr = 0;
        self.snapshots.clear();
    }

    fn stats(&self) -> &PredictorStats {
        &self.stats
    }
}
