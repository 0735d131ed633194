//! TAGE (Tagged Geometric History Length) predictor with speculative rollback.
//!
//! A base bimodal table backs a bank of tagged tables indexed with
//! geometrically increasing history lengths. The longest-history table whose
//! (index, tag) pair matches provides the prediction; the next match down is
//! the alternate, consulted when the provider is barely trained and the
//! meta-counter has learned that alternates are currently more reliable.
//!
//! Unlike a retire-time predictor, this one runs under speculative,
//! out-of-order timing: global history grows at prediction time with
//! *predicted* outcomes, and several branches are usually in flight at once.
//! Each prediction snapshots a checkpoint keyed by instruction identity; at
//! resolution the checkpoint's cycle markers locate the branch's own history
//! bit (corrected in place on a misprediction, leaving other branches' bits
//! untouched) and reconstruct the prediction-time history view for the hasher
//! so table updates land on the exact slots that produced the prediction.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::CondPredictor;
use crate::common::{InstId, SetupError};
use crate::config::{TageConfig, defaults};
use crate::history::GlobalHistory;
use crate::stats::PredictorStats;

/// Strongest taken counter value (3-bit signed).
const CTR_MAX: i8 = (1 << (defaults::TAGE_CTR_BITS - 1)) - 1;
/// Strongest not-taken counter value.
const CTR_MIN: i8 = -(1 << (defaults::TAGE_CTR_BITS - 1));
/// Largest usefulness value (2-bit).
const USEFUL_MAX: u8 = (1 << defaults::TAGE_USEFUL_BITS) - 1;
/// Provider confidence at or below which the alternate may be preferred.
const WEAK_MAGNITUDE: i8 = 1;
/// Largest meta-counter value (4-bit).
const USE_ALT_MAX: u8 = (1 << defaults::META_BITS) - 1;
/// Meta-counter midpoint; at or above it, weak providers defer to alternates.
const USE_ALT_THRESHOLD: u8 = 1 << (defaults::META_BITS - 1);
/// Strongest taken base counter value (2-bit signed).
const BASE_MAX: i8 = (1 << (defaults::BASE_CTR_BITS - 1)) - 1;
/// Strongest not-taken base counter value.
const BASE_MIN: i8 = -(1 << (defaults::BASE_CTR_BITS - 1));
/// Cold-start base counter fill: weakly not-taken.
const BASE_COLD: i8 = -1;
/// Tag sentinel marking a never-allocated slot; computed tags are at most
/// 15 bits wide and can never equal it.
const FREE_TAG: u16 = u16::MAX;

/// An entry in a tagged table.
#[derive(Debug, Clone, Copy)]
struct TaggedEntry {
    /// Folded (PC, history) tag, or [`FREE_TAG`] when never allocated.
    tag: u16,
    /// Signed prediction counter; `>= 0` means taken.
    ctr: i8,
    /// Usefulness counter driving the not-recently-useful allocation policy.
    u: u8,
}

impl TaggedEntry {
    const fn free() -> Self {
        Self {
            tag: FREE_TAG,
            ctr: 0,
            u: 0,
        }
    }
}

/// State snapshotted at prediction time, consumed exactly once at resolution.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    /// Table that provided the prediction, if any.
    provider: Option<usize>,
    /// Direction of the alternate (next shorter match, or the base table).
    alt_pred: bool,
    /// Global history cycle marker at prediction time.
    cycles_at_predict: u64,
    /// Cycle marker just after this branch's own speculative push, if any.
    pushed_at: Option<u64>,
}

/// TAGE predictor structure.
#[derive(Debug)]
pub struct TagePredictor {
    /// Table geometry and history parameters.
    cfg: TageConfig,
    /// Byte budget enforced at `setup()`.
    budget_bytes: usize,

    /// Base bimodal table of signed counters.
    base: Vec<i8>,
    /// Tagged tables, shortest history first.
    tables: Vec<Vec<TaggedEntry>>,
    /// Shared speculative global history.
    ghr: GlobalHistory,

    /// Meta-counter: trust alternates over weak providers when high.
    use_alt_on_na: u8,
    /// Resolutions since the last usefulness halving.
    reset_counter: u64,

    /// In-flight checkpoints keyed by instruction identity.
    checkpoints: HashMap<InstId, Checkpoint>,
    /// Counters accumulated since the last `setup()`.
    stats: PredictorStats,
}

impl TagePredictor {
    /// Creates a TAGE predictor with the given geometry and byte budget.
    ///
    /// No table is allocated here; `setup()` validates the geometry and the
    /// budget first, then allocates, so an oversized deserialized width is
    /// rejected with a typed error instead of an allocation failure.
    pub fn new(config: &TageConfig, budget_bytes: usize) -> Self {
        Self {
            cfg: config.clone(),
            budget_bytes,
            base: Vec::new(),
            tables: Vec::new(),
            ghr: GlobalHistory::new(config.max_history + config.history_buffer),
            use_alt_on_na: USE_ALT_THRESHOLD,
            reset_counter: 0,
            checkpoints: HashMap::new(),
            stats: PredictorStats::default(),
        }
    }

    /// Returns the shared global history register.
    pub const fn history(&self) -> &GlobalHistory {
        &self.ghr
    }

    /// Number of predictions still awaiting their resolution.
    pub fn in_flight(&self) -> usize {
        self.checkpoints.len()
    }

    /// Index into table `t`, hashed over history as of `skip` pushes ago.
    fn table_index(&self, pc: u64, t: usize, skip: usize) -> usize {
        let spec = &self.cfg.tables[t];
        self.ghr.fold(pc, spec.history, skip, spec.index_bits) as usize
    }

    /// Tag for table `t`, hashed over history as of `skip` pushes ago.
    fn table_tag(&self, pc: u64, t: usize, skip: usize) -> u16 {
        let spec = &self.cfg.tables[t];
        self.ghr.fold(pc, spec.history, skip, spec.tag_bits) as u16
    }

    /// Index into the base table for `pc`.
    fn base_index(&self, pc: u64) -> usize {
        (pc as usize) % self.base.len()
    }

    /// Finds the provider and alternate for `pc` against the history view
    /// `skip` pushes back. Returns `(provider, alt_pred)` where `alt_pred`
    /// falls back to the base direction when no shorter table matches.
    fn find_provider(&self, pc: u64, skip: usize) -> (Option<usize>, bool) {
        let base_pred = self.base[self.base_index(pc)] >= 0;
        for t in (0..self.tables.len()).rev() {
            let idx = self.table_index(pc, t, skip);
            if self.tables[t][idx].tag == self.table_tag(pc, t, skip) {
                for alt in (0..t).rev() {
                    let alt_idx = self.table_index(pc, alt, skip);
                    if self.tables[alt][alt_idx].tag == self.table_tag(pc, alt, skip) {
                        return (Some(t), self.tables[alt][alt_idx].ctr >= 0);
                    }
                }
                return (Some(t), base_pred);
            }
        }
        (None, base_pred)
    }

    /// Plants a weak entry for `pc` in the first not-recently-useful slot of
    /// a table longer than `from`, or records the failure.
    fn allocate(&mut self, pc: u64, skip: usize, from: usize, resolved_taken: bool) {
        for t in from..self.tables.len() {
            let idx = self.table_index(pc, t, skip);
            let tag = self.table_tag(pc, t, skip);
            let entry = &mut self.tables[t][idx];
            if entry.u == 0 {
                entry.tag = tag;
                entry.ctr = if resolved_taken { 0 } else { -1 };
                entry.u = 0;
                self.stats.allocations += 1;
                trace!(table = t, index = idx, "allocated tagged entry");
                return;
            }
        }
        self.stats.failed_allocations += 1;
        trace!(from, "no reclaimable tagged entry");
    }

    /// Halves every usefulness counter once `reset_period` branches resolved.
    fn age_usefulness(&mut self) {
        self.reset_counter += 1;
        if self.reset_counter < self.cfg.reset_period {
            return;
        }
        self.reset_counter = 0;
        for table in &mut self.tables {
            for entry in table {
                entry.u >>= 1;
            }
        }
        self.stats.usefulness_halvings += 1;
    }
}

impl CondPredictor for TagePredictor {
    /// Validates geometry and budget, then resets every table, the history
    /// register, the meta-counter, and all checkpoints to cold-start state.
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
            tables = self.cfg.tables.len(),
            "tage predictor storage within budget"
        );

        self.base = vec![BASE_COLD; 1 << self.cfg.base_index_bits];
        self.tables = self
            .cfg
            .tables
            .iter()
            .map(|spec| vec![TaggedEntry::free(); spec.entries()])
            .collect();
        self.ghr.clear();
        self.use_alt_on_na = USE_ALT_THRESHOLD;
        self.reset_counter = 0;
        self.checkpoints.clear();
        self.stats.reset();
        Ok(())
    }

    /// Scans tables from the longest history down for the provider and
    /// alternate, applies the weak-provider meta policy, and snapshots a
    /// checkpoint under the instruction identity.
    fn predict(&mut self, seq_no: u64, piece: u8, pc: u64) -> bool {
        let id = InstId::new(seq_no, piece);
        let (provider, alt_pred) = self.find_provider(pc, 0);

        let mut pred = provider.map_or(alt_pred, |t| {
            let idx = self.table_index(pc, t, 0);
            self.tables[t][idx].ctr >= 0
        });
        if let Some(t) = provider {
            let idx = self.table_index(pc, t, 0);
            let weak = self.tables[t][idx].ctr.abs() <= WEAK_MAGNITUDE;
            if weak && self.use_alt_on_na >= USE_ALT_THRESHOLD {
                pred = alt_pred;
            }
        }

        let previous = self.checkpoints.insert(
            id,
            Checkpoint {
                provider,
                alt_pred,
                cycles_at_predict: self.ghr.cycles(),
                pushed_at: None,
            },
        );
        assert!(
            previous.is_none(),
            "duplicate predict for in-flight instruction ({id})"
        );

        self.stats.predictions += 1;
        pred
    }

    /// Appends the predicted outcome to speculative history and records the
    /// push position in the identity's checkpoint.
    fn history_update(&mut self, seq_no: u64, piece: u8, _pc: u64, pred_taken: bool, _next_pc: u64) {
        let id = InstId::new(seq_no, piece);
        self.ghr.push(pred_taken);
        let cycles = self.ghr.cycles();
        match self.checkpoints.get_mut(&id) {
            Some(cp) => cp.pushed_at = Some(cycles),
            None => panic!("history_update without a live prediction ({id})"),
        }
    }

    /// Applies the resolved outcome: corrects the branch's own history bit,
    /// trains the provider (or base) against the prediction-time history
    /// view, allocates on mispredictions, adjusts the meta-counter, and
    /// discards the checkpoint.
    ///
    /// `pred_taken` is the harness's echo of the direction it acted on and
    /// is trusted over the checkpoint; misprediction, usefulness, and meta
    /// training all key off it.
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
        let Some(cp) = self.checkpoints.remove(&id) else {
            panic!("update without a live prediction ({id})");
        };

        let mispredicted = resolved_taken != pred_taken;

        // Repair exactly this branch's speculative bit; bits pushed by other
        // still-open branches in between stay as predicted.
        if mispredicted {
            if let Some(pushed_at) = cp.pushed_at {
                let delta = self.ghr.cycles() - pushed_at;
                self.ghr.rewrite(delta, resolved_taken);
            }
        }

        // Hash against history as it stood at prediction time, so counter
        // and tag updates hit the slots that actually produced the
        // prediction rather than slots implied by the now-advanced history.
        let skip = (self.ghr.cycles() - cp.cycles_at_predict) as usize;

        if let Some(t) = cp.provider {
            let idx = self.table_index(pc, t, skip);
            let entry = &mut self.tables[t][idx];

            if resolved_taken {
                entry.ctr = (entry.ctr + 1).min(CTR_MAX);
            } else {
                entry.ctr = (entry.ctr - 1).max(CTR_MIN);
            }

            // The provider's presence changed the final direction; reward or
            // punish it for having overridden the alternate.
            if cp.alt_pred != pred_taken {
                if pred_taken == resolved_taken {
                    entry.u = (entry.u + 1).min(USEFUL_MAX);
                } else {
                    entry.u = entry.u.saturating_sub(1);
                }
            }

            if mispredicted {
                self.allocate(pc, skip, t + 1, resolved_taken);
            }

            if cp.alt_pred == resolved_taken && pred_taken != resolved_taken {
                self.use_alt_on_na = (self.use_alt_on_na + 1).min(USE_ALT_MAX);
            } else if cp.alt_pred != resolved_taken && pred_taken == resolved_taken {
                self.use_alt_on_na = self.use_alt_on_na.saturating_sub(1);
            }
        } else {
            let idx = self.base_index(pc);
            let ctr = &mut self.base[idx];
            if resolved_taken {
                *ctr = (*ctr + 1).min(BASE_MAX);
            } else {
                *ctr = (*ctr - 1).max(BASE_MIN);
            }

            if mispredicted {
                self.allocate(pc, skip, 0, resolved_taken);
            }
        }

        self.age_usefulness();

        self.stats.resolutions += 1;
        if mispredicted {
            self.stats.mispredictions += 1;
        }
    }

    /// Releases all tables, history, and in-flight checkpoints.
    fn terminate(&mut self) {
        self.base = Vec::new();
        self.tables = Vec::new();
        self.ghr.clear();
        self.use_alt_on_na = USE_ALT_THRESHOLD;
        self.reset_counter = 0;
        self.checkpoints.clear();
    }

    fn stats(&self) -> &PredictorStats {
        &self.stats
    }
}
