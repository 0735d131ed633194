//! Conditional Direction Predictor Interface.
//!
//! This module defines the `CondPredictor` trait implemented by every
//! direction prediction algorithm. The driving harness invokes the five calls
//! sequentially, but many branch instances may be open (predicted, not yet
//! resolved) at once, and resolution order across identities is arbitrary.

use crate::common::SetupError;
use crate::stats::PredictorStats;

/// Trait for conditional branch direction predictors.
///
/// Call contract, per instruction identity `(seq_no, piece)`:
/// `predict` first, then zero or more `history_update` calls, then exactly
/// one `update`. No call for an identity may follow its `update`. `piece`
/// must be below 16 and the identity unique among concurrently open branches.
/// Implementations holding per-branch checkpoints panic on violations rather
/// than silently reusing stale state.
pub trait CondPredictor {
    /// (Re)initializes all tables, history, and counters to cold-start
    /// values, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] when the configuration is structurally
    /// invalid or its true bit cost exceeds the memory budget.
    fn setup(&mut self) -> Result<(), SetupError>;

    /// Predicts whether the branch at `pc` will be taken.
    ///
    /// Side effect: predictors with speculative state snapshot a checkpoint
    /// under the instruction identity.
    fn predict(&mut self, seq_no: u64, piece: u8, pc: u64) -> bool;

    /// Speculatively records `pred_taken` in branch history.
    ///
    /// Called zero or more times per identity, always after its `predict`
    /// and before its `update`. `next_pc` is the fetch target that followed
    /// the branch.
    fn history_update(&mut self, seq_no: u64, piece: u8, pc: u64, pred_taken: bool, next_pc: u64);

    /// Applies the authoritative outcome for a resolved branch.
    ///
    /// Corrects speculative history, trains tables, and discards the
    /// identity's checkpoint. `pred_taken` is the direction the harness acted
    /// on; `resolved_taken` is the true outcome.
    fn update(
        &mut self,
        seq_no: u64,
        piece: u8,
        pc: u64,
        resolved_taken: bool,
        pred_taken: bool,
        next_pc: u64,
    );

    /// Releases all state. Only a fresh `setup()` is valid afterwards.
    fn terminate(&mut self);

    /// Returns the counters accumulated since the last `setup()`.
    fn stats(&self) -> &PredictorStats;
}
