//! Common types shared across predictors.
//!
//! This module collects the small leaf types every predictor relies on:
//! 1. **Instruction identity:** The `(seq_no, piece)` key correlating a
//!    prediction with its later resolution.
//! 2. **Errors:** Typed setup failures for configuration and budget problems.

pub use self::error::SetupError;
pub use self::inst::InstId;

/// Setup-time error definitions.
pub mod error;

/// Instruction identity for in-flight branches.
pub mod inst;
