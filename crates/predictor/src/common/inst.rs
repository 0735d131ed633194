//! Instruction identity for in-flight branches.
//!
//! The trace harness names each dynamic branch by a monotonically increasing
//! sequence number plus a small piece index (a branch split into sub-pieces
//! keeps one sequence number and distinct pieces). The identity correlates a
//! prediction with its later resolution and must be unique among all branches
//! that are simultaneously open.

use std::fmt;

/// Number of low bits reserved for the piece index.
const PIECE_BITS: u32 = 4;

/// Mask selecting the piece index.
const PIECE_MASK: u64 = (1 << PIECE_BITS) - 1;

/// Unique identity of one in-flight branch: `(seq_no << 4) | piece`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstId(u64);

impl InstId {
    /// Builds an identity from a sequence number and piece index.
    ///
    /// # Panics
    ///
    /// Panics when `piece >= 16`; the harness guarantees the piece index fits
    /// in four bits, so a wider value means the caller is broken.
    pub fn new(seq_no: u64, piece: u8) -> Self {
        assert!(
            u64::from(piece) <= PIECE_MASK,
            "piece index {piece} does not fit in {PIECE_BITS} bits"
        );
        Self((seq_no << PIECE_BITS) | u64::from(piece))
    }

    /// Returns the sequence number component.
    pub const fn seq_no(self) -> u64 {
        self.0 >> PIECE_BITS
    }

    /// Returns the piece index component.
    pub const fn piece(self) -> u8 {
        (self.0 & PIECE_MASK) as u8
    }

    /// Returns the packed key value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq {} piece {}", self.seq_no(), self.piece())
    }
}
