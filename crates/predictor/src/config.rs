//! Predictor configuration.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the predictors. It provides:
//! 1. **Defaults:** Baseline geometry (table spread, counter widths, budget).
//! 2. **Structures:** Hierarchical config for the TAGE core and each variant.
//! 3. **Validation:** Structural checks and true-bit-cost storage arithmetic
//!    consumed by `setup()` when enforcing the memory budget.
//!
//! Configuration is supplied as JSON via serde or built with `Config::default()`.

use serde::Deserialize;

use crate::common::SetupError;

/// Default configuration constants for the predictors.
///
/// These values define the baseline predictor geometry when not explicitly
/// overridden in a deserialized configuration.
pub mod defaults {
    /// Memory budget for predictor state (192 KiB).
    ///
    /// The summed bit cost of history, base table, tagged tables, and the
    /// meta-counter must fit in this many bytes or `setup()` fails.
    pub const BUDGET_BYTES: usize = 192 * 1024;

    /// Base predictor index width (2^14 = 16K entries).
    pub const BASE_INDEX_BITS: u32 = 14;

    /// Base predictor counter width (2 bits, range [-2, 1]).
    pub const BASE_CTR_BITS: usize = 2;

    /// Tagged table prediction counter width (3 bits, range [-4, 3]).
    pub const TAGE_CTR_BITS: usize = 3;

    /// Tagged table usefulness counter width (2 bits, range [0, 3]).
    pub const TAGE_USEFUL_BITS: usize = 2;

    /// Meta-counter width deciding weak-provider/alternate trust (4 bits).
    pub const META_BITS: usize = 4;

    /// Maximum global history length consumed by any tagged table (640 bits).
    pub const MAX_HISTORY: usize = 640;

    /// Extra history retained beyond `MAX_HISTORY` so bits stay addressable
    /// while their branches remain in flight (32 bits).
    pub const HISTORY_BUFFER: usize = 32;

    /// Resolutions between halvings of every usefulness counter (512K).
    pub const RESET_PERIOD: u64 = 512 * 1024;

    /// Widest supported tagged-table index (folded hash output limit).
    pub const MAX_INDEX_BITS: u32 = 24;

    /// Widest supported tag (tags are stored in 16 bits with one sentinel).
    pub const MAX_TAG_BITS: u32 = 15;

    /// Widest supported two-level per-branch history register.
    pub const MAX_TWO_LEVEL_HISTORY_BITS: u32 = 16;

    /// Longest perceptron history the 64-bit register supports.
    pub const MAX_PERCEPTRON_HISTORY: usize = 64;

    /// Bimodal predictor index width (2^14 = 16K entries).
    pub const BIMODAL_INDEX_BITS: u32 = 14;

    /// Two-level predictor per-branch history width (4 bits).
    pub const TWO_LEVEL_HISTORY_BITS: u32 = 4;

    /// Two-level predictor pattern table set count (256 sets).
    pub const TWO_LEVEL_SETS: usize = 256;

    /// Perceptron global history length (32 bits).
    pub const PERCEPTRON_HISTORY: usize = 32;

    /// Perceptron weight table size (log2, 4096 rows).
    pub const PERCEPTRON_TABLE_BITS: u32 = 12;

    /// Perceptron training threshold.
    pub const PERCEPTRON_THETA: i32 = 20;
}

/// Conditional direction predictor implementation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PredictorKind {
    /// Tagged geometric-history predictor with checkpoint/rollback (default).
    #[serde(alias = "TAGE")]
    #[default]
    Tage,
    /// PC-indexed table of 2-bit saturating counters.
    Bimodal,
    /// Per-PC history registers over a shared pattern table.
    TwoLevel,
    /// Backward-taken / forward-not-taken with learned targets.
    BtFnt,
    /// Hashed signed weight vectors over global history.
    Perceptron,
}

/// Root configuration structure containing all predictor settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Which predictor implementation to construct.
    #[serde(default)]
    pub predictor: PredictorKind,

    /// Byte budget for predictor state, enforced at `setup()`.
    #[serde(default = "Config::default_budget_bytes")]
    pub budget_bytes: usize,

    /// TAGE predictor configuration.
    #[serde(default)]
    pub tage: TageConfig,

    /// Bimodal predictor configuration.
    #[serde(default)]
    pub bimodal: BimodalConfig,

    /// Two-level predictor configuration.
    #[serde(default)]
    pub two_level: TwoLevelConfig,

    /// Perceptron predictor configuration.
    #[serde(default)]
    pub perceptron: PerceptronConfig,
}

impl Config {
    /// Returns the default memory budget in bytes.
    fn default_budget_bytes() -> usize {
        defaults::BUDGET_BYTES
    }
}

impl Default for Config {
    /// Creates the default configuration, mirroring the serde defaults.
    fn default() -> Self {
        Self {
            predictor: PredictorKind::default(),
            budget_bytes: Self::default_budget_bytes(),
            tage: TageConfig::default(),
            bimodal: BimodalConfig::default(),
            two_level: TwoLevelConfig::default(),
            perceptron: PerceptronConfig::default(),
        }
    }
}

/// Geometry of one tagged table: history length, index width, tag width.
///
/// Longer histories pair with fewer index bits so the spread stays inside the
/// budget while long-history entries remain specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TableSpec {
    /// Number of newest global history bits folded into this table's hashes.
    pub history: usize,
    /// Index width; the table holds `2^index_bits` entries.
    pub index_bits: u32,
    /// Tag width stored per entry.
    pub tag_bits: u32,
}

impl TableSpec {
    /// Number of entries in a table with this geometry.
    pub const fn entries(&self) -> usize {
        1 << self.index_bits
    }

    /// True bit cost of one entry (tag + prediction counter + usefulness).
    pub const fn entry_bits(&self) -> usize {
        self.tag_bits as usize + defaults::TAGE_CTR_BITS + defaults::TAGE_USEFUL_BITS
    }
}

/// TAGE (tagged geometric history length) predictor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TageConfig {
    /// Base predictor index width (entries = 2^bits).
    #[serde(default = "TageConfig::default_base_index_bits")]
    pub base_index_bits: u32,

    /// Longest history any table may request.
    #[serde(default = "TageConfig::default_max_history")]
    pub max_history: usize,

    /// Extra retained history bits covering in-flight rollback distance.
    #[serde(default = "TageConfig::default_history_buffer")]
    pub history_buffer: usize,

    /// Resolutions between usefulness-counter halvings.
    #[serde(default = "TageConfig::default_reset_period")]
    pub reset_period: u64,

    /// Tagged table geometries, shortest history first, strictly increasing.
    #[serde(default = "TageConfig::default_tables")]
    pub tables: Vec<TableSpec>,
}

impl TageConfig {
    /// Returns the default base predictor index width.
    fn default_base_index_bits() -> u32 {
        defaults::BASE_INDEX_BITS
    }

    /// Returns the default maximum history length.
    fn default_max_history() -> usize {
        defaults::MAX_HISTORY
    }

    /// Returns the default rollback history buffer.
    fn default_history_buffer() -> usize {
        defaults::HISTORY_BUFFER
    }

    /// Returns the default usefulness reset period.
    fn default_reset_period() -> u64 {
        defaults::RESET_PERIOD
    }

    /// Returns the default 12-table geometric spread (4 to 640 history bits).
    fn default_tables() -> Vec<TableSpec> {
        const SPREAD: [(usize, u32, u32); 12] = [
            (4, 10, 7),
            (6, 10, 7),
            (10, 11, 8),
            (16, 11, 8),
            (25, 11, 9),
            (40, 11, 10),
            (64, 10, 11),
            (101, 10, 12),
            (160, 10, 12),
            (254, 9, 13),
            (403, 9, 14),
            (640, 9, 15),
        ];
        SPREAD
            .iter()
            .map(|&(history, index_bits, tag_bits)| TableSpec {
                history,
                index_bits,
                tag_bits,
            })
            .collect()
    }

    /// Checks structural invariants of the table spread.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant: base index width outside its
    /// supported range, empty spread, non-increasing or over-long histories,
    /// or index/tag widths outside hasher and storage limits.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.base_index_bits == 0 || self.base_index_bits > defaults::MAX_INDEX_BITS {
            return Err(SetupError::BaseIndexWidthUnsupported {
                bits: self.base_index_bits,
                max: defaults::MAX_INDEX_BITS,
            });
        }
        if self.tables.is_empty() {
            return Err(SetupError::NoTables);
        }
        let mut prev_len = 0usize;
        for (table, spec) in self.tables.iter().enumerate() {
            if spec.history > self.max_history {
                return Err(SetupError::HistoryTooLong {
                    table,
                    len: spec.history,
                    max: self.max_history,
                });
            }
            if table > 0 && spec.history <= prev_len {
                return Err(SetupError::HistoryNotIncreasing {
                    table,
                    len: spec.history,
                    prev_len,
                });
            }
            if spec.index_bits == 0 || spec.index_bits > defaults::MAX_INDEX_BITS {
                return Err(SetupError::IndexWidthUnsupported {
                    table,
                    bits: spec.index_bits,
                    max: defaults::MAX_INDEX_BITS,
                });
            }
            if spec.tag_bits == 0 || spec.tag_bits > defaults::MAX_TAG_BITS {
                return Err(SetupError::TagWidthUnsupported {
                    table,
                    bits: spec.tag_bits,
                    max: defaults::MAX_TAG_BITS,
                });
            }
            prev_len = spec.history;
        }
        Ok(())
    }

    /// True bit cost of all TAGE state: history register (with rollback
    /// buffer), base table, every tagged table, and the meta-counter.
    pub fn storage_bits(&self) -> usize {
        let mut bits = self.max_history + self.history_buffer;
        bits += (1usize << self.base_index_bits) * defaults::BASE_CTR_BITS;
        for spec in &self.tables {
            bits += spec.entries() * spec.entry_bits();
        }
        bits + defaults::META_BITS
    }

    /// Storage cost rounded up to whole bytes.
    pub fn storage_bytes(&self) -> usize {
        self.storage_bits().div_ceil(8)
    }
}

impl Default for TageConfig {
    /// Creates the default L-TAGE-style configuration: 16K-entry base table,
    /// 640-bit history, and a 12-table geometric spread.
    fn default() -> Self {
        Self {
            base_index_bits: Self::default_base_index_bits(),
            max_history: Self::default_max_history(),
            history_buffer: Self::default_history_buffer(),
            reset_period: Self::default_reset_period(),
            tables: Self::default_tables(),
        }
    }
}

/// Bimodal predictor configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BimodalConfig {
    /// Counter table index width (entries = 2^bits).
    #[serde(default = "BimodalConfig::default_index_bits")]
    pub index_bits: u32,
}

impl BimodalConfig {
    /// Returns the default bimodal index width.
    fn default_index_bits() -> u32 {
        defaults::BIMODAL_INDEX_BITS
    }
}

impl Default for BimodalConfig {
    fn default() -> Self {
        Self {
            index_bits: Self::default_index_bits(),
        }
    }
}

/// Two-level adaptive predictor configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TwoLevelConfig {
    /// Width of each branch's history register (pattern entries = 2^bits).
    #[serde(default = "TwoLevelConfig::default_history_bits")]
    pub history_bits: u32,

    /// Number of pattern table sets; branches are grouped by PC modulo sets.
    #[serde(default = "TwoLevelConfig::default_sets")]
    pub sets: usize,
}

impl TwoLevelConfig {
    /// Returns the default per-branch history width.
    fn default_history_bits() -> u32 {
        defaults::TWO_LEVEL_HISTORY_BITS
    }

    /// Returns the default pattern table set count.
    fn default_sets() -> usize {
        defaults::TWO_LEVEL_SETS
    }

    /// Checks structural invariants of the pattern table geometry.
    ///
    /// # Errors
    ///
    /// Returns an error when the set count is zero or the per-branch history
    /// width is zero or wider than its register supports.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.sets == 0 {
            return Err(SetupError::NoSets);
        }
        if self.history_bits == 0 || self.history_bits > defaults::MAX_TWO_LEVEL_HISTORY_BITS {
            return Err(SetupError::LocalHistoryWidthUnsupported {
                bits: self.history_bits,
                max: defaults::MAX_TWO_LEVEL_HISTORY_BITS,
            });
        }
        Ok(())
    }
}

impl Default for TwoLevelConfig {
    fn default() -> Self {
        Self {
            history_bits: Self::default_history_bits(),
            sets: Self::default_sets(),
        }
    }
}

/// Perceptron predictor configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PerceptronConfig {
    /// Global history length feeding the dot product.
    #[serde(default = "PerceptronConfig::default_history_length")]
    pub history_length: usize,

    /// Weight table size (log2 of the row count).
    #[serde(default = "PerceptronConfig::default_table_bits")]
    pub table_bits: u32,

    /// Training threshold; rows train when wrong or `|output| <= theta`.
    #[serde(default = "PerceptronConfig::default_theta")]
    pub theta: i32,
}

impl PerceptronConfig {
    /// Returns the default perceptron history length.
    fn default_history_length() -> usize {
        defaults::PERCEPTRON_HISTORY
    }

    /// Returns the default weight table size (log2).
    fn default_table_bits() -> u32 {
        defaults::PERCEPTRON_TABLE_BITS
    }

    /// Returns the default training threshold.
    fn default_theta() -> i32 {
        defaults::PERCEPTRON_THETA
    }

    /// Checks structural invariants of the weight table geometry.
    ///
    /// # Errors
    ///
    /// Returns an error when the table width or history length is zero or
    /// wider than the hasher and history register support.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.table_bits == 0 || self.table_bits > defaults::MAX_INDEX_BITS {
            return Err(SetupError::WeightTableWidthUnsupported {
                bits: self.table_bits,
                max: defaults::MAX_INDEX_BITS,
            });
        }
        if self.history_length == 0 || self.history_length > defaults::MAX_PERCEPTRON_HISTORY {
            return Err(SetupError::HistoryLengthUnsupported {
                len: self.history_length,
                max: defaults::MAX_PERCEPTRON_HISTORY,
            });
        }
        Ok(())
    }

    /// Number of weight rows.
    pub const fn entries(&self) -> usize {
        1 << self.table_bits
    }

    /// Storage cost in bytes: one signed byte per weight, history + bias
    /// weights per row.
    pub const fn storage_bytes(&self) -> usize {
        self.entries() * (self.history_length + 1)
    }
}

impl Default for PerceptronConfig {
    fn default() -> Self {
        Self {
            history_length: Self::default_history_length(),
            table_bits: Self::default_table_bits(),
            theta: Self::default_theta(),
        }
    }
}
