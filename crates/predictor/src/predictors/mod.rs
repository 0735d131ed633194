//! Conditional direction predictors.
//!
//! This module contains the speculative TAGE core plus the simpler variants
//! sharing the same five-call trace interface: bimodal, two-level adaptive,
//! backward-taken/forward-not-taken, and perceptron.

pub use self::cond_predictor::CondPredictor;

/// Direction predictor trait and call contract documentation.
pub mod cond_predictor;

/// PC-indexed 2-bit saturating counter predictor.
pub mod bimodal;

/// Backward-taken / forward-not-taken predictor.
pub mod btfnt;

/// Perceptron predictor over global history.
pub mod perceptron;

/// Tagged geometric history length predictor with checkpoint/rollback.
pub mod tage;

/// Two-level adaptive predictor with per-PC history registers.
pub mod two_level;

use self::{
    bimodal::BimodalPredictor, btfnt::BtFntPredictor, perceptron::PerceptronPredictor,
    tage::TagePredictor, two_level::TwoLevelPredictor,
};
use crate::common::SetupError;
use crate::config::{Config, PredictorKind};
use crate::stats::PredictorStats;

/// Enum wrapper for static dispatch over the configured predictor.
///
/// This avoids vtable lookups in the per-branch hot path.
#[derive(Debug)]
pub enum CondPredictorWrapper {
    /// Tagged geometric-history predictor.
    Tage(TagePredictor),
    /// Flat 2-bit counter predictor.
    Bimodal(BimodalPredictor),
    /// Two-level adaptive predictor.
    TwoLevel(TwoLevelPredictor),
    /// Backward-taken / forward-not-taken predictor.
    BtFnt(BtFntPredictor),
    /// Perceptron predictor.
    Perceptron(PerceptronPredictor),
}

impl CondPredictorWrapper {
    /// Creates the predictor selected by the configuration.
    pub fn new(config: &Config) -> Self {
        match config.predictor {
            PredictorKind::Tage => {
                Self::Tage(TagePredictor::new(&config.tage, config.budget_bytes))
            }
            PredictorKind::Bimodal => Self::Bimodal(BimodalPredictor::new(&config.bimodal)),
            PredictorKind::TwoLevel => Self::TwoLevel(TwoLevelPredictor::new(&config.two_level)),
            PredictorKind::BtFnt => Self::BtFnt(BtFntPredictor::new()),
            PredictorKind::Perceptron => Self::Perceptron(PerceptronPredictor::new(
                &config.perceptron,
                config.budget_bytes,
            )),
        }
    }
}

impl CondPredictor for CondPredictorWrapper {
    #[inline]
    fn setup(&mut self) -> Result<(), SetupError> {
        match self {
            Self::Tage(bp) => bp.setup(),
            Self::Bimodal(bp) => bp.setup(),
            Self::TwoLevel(bp) => bp.setup(),
            Self::BtFnt(bp) => bp.setup(),
            Self::Perceptron(bp) => bp.setup(),
        }
    }

    #[inline]
    fn predict(&mut self, seq_no: u64, piece: u8, pc: u64) -> bool {
        match self {
            Self::Tage(bp) => bp.predict(seq_no, piece, pc),
            Self::Bimodal(bp) => bp.predict(seq_no, piece, pc),
            Self::TwoLevel(bp) => bp.predict(seq_no, piece, pc),
            Self::BtFnt(bp) => bp.predict(seq_no, piece, pc),
            Self::Perceptron(bp) => bp.predict(seq_no, piece, pc),
        }
    }

    #[inline]
    fn history_update(&mut self, seq_no: u64, piece: u8, pc: u64, pred_taken: bool, next_pc: u64) {
        match self {
            Self::Tage(bp) => bp.history_update(seq_no, piece, pc, pred_taken, next_pc),
            Self::Bimodal(bp) => bp.history_update(seq_no, piece, pc, pred_taken, next_pc),
            Self::TwoLevel(bp) => bp.history_update(seq_no, piece, pc, pred_taken, next_pc),
            Self::BtFnt(bp) => bp.history_update(seq_no, piece, pc, pred_taken, next_pc),
            Self::Perceptron(bp) => bp.history_update(seq_no, piece, pc, pred_taken, next_pc),
        }
    }

    #[inline]
    fn update(
        &mut self,
        seq_no: u64,
        piece: u8,
        pc: u64,
        resolved_taken: bool,
        pred_taken: bool,
        next_pc: u64,
    ) {
        match self {
            Self::Tage(bp) => bp.update(seq_no, piece, pc, resolved_taken, pred_taken, next_pc),
            Self::Bimodal(bp) => bp.update(seq_no, piece, pc, resolved_taken, pred_taken, next_pc),
            Self::TwoLevel(bp) => {
                bp.update(seq_no, piece, pc, resolved_taken, pred_taken, next_pc);
            }
            Self::BtFnt(bp) => bp.update(seq_no, piece, pc, resolved_taken, pred_taken, next_pc),
            Self::Perceptron(bp) => {
                bp.update(seq_no, piece, pc, resolved_taken, pred_taken, next_pc);
            }
        }
    }

    #[inline]
    fn terminate(&mut self) {
        match self {
            Self::Tage(bp) => bp.terminate(),
            Self::Bimodal(bp) => bp.terminate(),
            Self::TwoLevel(bp) => bp.terminate(),
            Self::BtFnt(bp) => bp.terminate(),
            Self::Perceptron(bp) => bp.terminate(),
        }
    }

    #[inline]
    fn stats(&self) -> &PredictorStats {
        match self {
            Self::Tage(bp) => bp.stats(),
            Self::Bimodal(bp) => bp.stats(),
            Self::TwoLevel(bp) => bp.stats(),
            Self::BtFnt(bp) => bp.stats(),
            Self::Perceptron(bp) => bp.stats(),
        }
    }
}
