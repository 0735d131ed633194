//! Prediction statistics collection.
//!
//! Tracks per-predictor counters for analysis by the driving harness:
//! 1. **Volume:** Predictions issued and resolutions observed.
//! 2. **Quality:** Mispredictions and derived accuracy.
//! 3. **Table churn (TAGE):** Allocations, failed allocations, and periodic
//!    usefulness halvings.

/// Counters describing one predictor's behavior over a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PredictorStats {
    /// Number of `predict` calls issued.
    pub predictions: u64,
    /// Number of `update` calls (resolved branches).
    pub resolutions: u64,
    /// Resolutions whose predicted direction was wrong.
    pub mispredictions: u64,
    /// Tagged entries freshly planted after a misprediction.
    pub allocations: u64,
    /// Mispredictions where no table had a reclaimable entry.
    pub failed_allocations: u64,
    /// Periodic halvings of every usefulness counter.
    pub usefulness_halvings: u64,
}

impl PredictorStats {
    /// Fraction of resolved branches predicted correctly, in `[0.0, 1.0]`.
    ///
    /// Returns `1.0` before any branch has resolved.
    pub fn accuracy(&self) -> f64 {
        if self.resolutions == 0 {
            return 1.0;
        }
        let correct = self.resolutions - self.mispredictions;
        correct as f64 / self.resolutions as f64
    }

    /// Clears every counter back to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
