//! Setup-time error definitions.
//!
//! Errors in this library fall into two classes. Configuration problems are
//! reported from `setup()` through [`SetupError`] so the harness can reject a
//! run before any prediction is made. Caller-contract violations at prediction
//! or resolution time (unknown instruction identity, out-of-range piece) are
//! programming errors in the driving harness and panic instead; continuing
//! would corrupt shared tables.

use thiserror::Error;

/// Error returned when `setup()` rejects a predictor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// The summed bit cost of all predictor state exceeds the byte budget.
    #[error("predictor storage needs {required} bytes but the budget is {budget} bytes")]
    BudgetExceeded {
        /// Bytes required by the configured tables, history, and counters.
        required: usize,
        /// Configured byte budget.
        budget: usize,
    },

    /// The tagged table list is empty.
    #[error("at least one tagged table is required")]
    NoTables,

    /// A table's history length exceeds the configured maximum history.
    #[error("table {table} history length {len} exceeds the maximum history {max}")]
    HistoryTooLong {
        /// Zero-based table position.
        table: usize,
        /// Offending history length.
        len: usize,
        /// Configured maximum history length.
        max: usize,
    },

    /// Table history lengths must strictly increase across the bank.
    #[error("table {table} history length {len} does not exceed the previous table's {prev_len}")]
    HistoryNotIncreasing {
        /// Zero-based table position.
        table: usize,
        /// Offending history length.
        len: usize,
        /// History length of the preceding table.
        prev_len: usize,
    },

    /// The base predictor index width is zero or wider than supported.
    #[error("base predictor index width {bits} is outside the supported 1..={max} bits")]
    BaseIndexWidthUnsupported {
        /// Offending index width.
        bits: u32,
        /// Widest supported index.
        max: u32,
    },

    /// A table's index width is zero or wider than the hasher supports.
    #[error("table {table} index width {bits} is outside the supported 1..={max} bits")]
    IndexWidthUnsupported {
        /// Zero-based table position.
        table: usize,
        /// Offending index width.
        bits: u32,
        /// Widest supported index.
        max: u32,
    },

    /// A table's tag width is zero or wider than tag storage supports.
    #[error("table {table} tag width {bits} is outside the supported 1..={max} bits")]
    TagWidthUnsupported {
        /// Zero-based table position.
        table: usize,
        /// Offending tag width.
        bits: u32,
        /// Widest supported tag.
        max: u32,
    },

    /// The pattern table has no sets.
    #[error("at least one pattern table set is required")]
    NoSets,

    /// A per-branch history register width is zero or wider than supported.
    #[error("per-branch history width {bits} is outside the supported 1..={max} bits")]
    LocalHistoryWidthUnsupported {
        /// Offending history register width.
        bits: u32,
        /// Widest supported register.
        max: u32,
    },

    /// The weight table width is zero or wider than supported.
    #[error("weight table width {bits} is outside the supported 1..={max} bits")]
    WeightTableWidthUnsupported {
        /// Offending table width.
        bits: u32,
        /// Widest supported table.
        max: u32,
    },

    /// A global history length is zero or longer than its register.
    #[error("history length {len} is outside the supported 1..={max} bits")]
    HistoryLengthUnsupported {
        /// Offending history length.
        len: usize,
        /// Longest supported history.
        max: usize,
    },
}
