//! Speculative conditional branch direction predictor library.
//!
//! This crate models the direction side of a branch prediction unit driven by
//! an external trace harness. It provides:
//! 1. **Core:** A TAGE-class predictor (geometric tagged tables, base bimodal
//!    fallback, alternate selection, usefulness-driven allocation) with a
//!    checkpoint/rollback protocol for speculative global history.
//! 2. **Variants:** Bimodal, two-level adaptive, backward-taken/forward-not-taken,
//!    and perceptron predictors behind the same five-call interface.
//! 3. **Configuration:** Serde-deserializable config with documented defaults
//!    and hard memory-budget validation at `setup()`.
//! 4. **Statistics:** Per-predictor lookup, misprediction, and allocation counts.
//!
//! The harness contract is sequential but overlapped: many branches may be
//! predicted before any of them resolves, and resolution order is arbitrary.
//! Each `predict` must be matched by exactly one `update` for the same
//! `(seq_no, piece)` identity; contract violations panic rather than silently
//! corrupting shared tables.

/// Common types (instruction identity, setup errors).
pub mod common;
/// Predictor configuration (defaults, enums, per-predictor structures).
pub mod config;
/// Rewindable global history register and folded-history hashing.
pub mod history;
/// Conditional direction predictors (TAGE core plus simpler variants).
pub mod predictors;
/// Prediction statistics collection.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Trait implemented by every direction predictor.
pub use crate::predictors::CondPredictor;
/// Enum wrapper for static dispatch over the configured predictor.
pub use crate::predictors::CondPredictorWrapper;
