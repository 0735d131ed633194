//! Rewindable global history register and folded-history hashing.
//!
//! The global history register (GHR) is one shared, append-only-but-rewindable
//! sequence of branch outcomes. Bits are pushed speculatively at prediction
//! time and may later be corrected in place when the branch resolves. Because
//! resolution happens after further speculative pushes for other branches, all
//! positions are expressed relative to the newest end: a branch that pushed
//! its bit `delta` pushes ago finds it at distance `delta` from the back,
//! regardless of how many old bits fell off the front in between.
//!
//! The folded hash projects the PC plus the newest `L` history bits down to a
//! fixed output width. An explicit `skip` count evaluates the hash against the
//! history as it stood `skip` pushes ago, which is how resolution-time table
//! updates land on the exact slots that produced the original prediction.

use std::collections::VecDeque;

/// Bounded, rewindable global history register.
#[derive(Debug, Clone)]
pub struct GlobalHistory {
    /// Outcome bits, oldest at the front, newest at the back.
    bits: VecDeque<bool>,
    /// Maximum number of retained bits (history plus rollback buffer).
    capacity: usize,
    /// Total pushes ever performed; the monotone cycle marker.
    cycles: u64,
}

impl GlobalHistory {
    /// Creates an empty history retaining at most `capacity` bits.
    pub fn new(capacity: usize) -> Self {
        Self {
            bits: VecDeque::with_capacity(capacity),
            capacity,
            cycles: 0,
        }
    }

    /// Removes all bits and resets the cycle marker.
    pub fn clear(&mut self) {
        self.bits.clear();
        self.cycles = 0;
    }

    /// Appends a speculative outcome bit, evicting the oldest bit when full.
    pub fn push(&mut self, taken: bool) {
        if self.bits.len() == self.capacity {
            let _ = self.bits.pop_front();
        }
        self.bits.push_back(taken);
        self.cycles += 1;
    }

    /// Returns the monotone count of pushes performed so far.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Returns the number of currently retained bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns `true` when no bits are retained.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns the bit `n` positions from the newest end (0 = newest).
    pub fn nth_newest(&self, n: usize) -> Option<bool> {
        self.bits.iter().rev().nth(n).copied()
    }

    /// Corrects, in place, the bit pushed `delta` pushes ago.
    ///
    /// Only the resolving branch's own bit changes; bits pushed by other
    /// still-open branches on either side are untouched.
    ///
    /// # Panics
    ///
    /// Panics when the target bit has already been evicted, i.e. the branch
    /// stayed in flight longer than the rollback buffer allows.
    pub fn rewrite(&mut self, delta: u64, taken: bool) {
        let len = self.bits.len() as u64;
        assert!(
            delta < len,
            "history rollback window exceeded: bit pushed {delta} cycles ago, {len} bits retained"
        );
        let idx = (len - 1 - delta) as usize;
        self.bits[idx] = taken;
    }

    /// Folds the PC and the newest `hist_len` bits into a `width`-bit value.
    ///
    /// `skip` ignores that many of the newest bits first, reconstructing the
    /// history as it stood `skip` pushes ago. Each consumed bit is XORed into
    /// the accumulator at a rotating position below `width`, so different
    /// history contents and different PCs rarely collide.
    pub fn fold(&self, pc: u64, hist_len: usize, skip: usize, width: u32) -> u64 {
        let mask = (1u64 << width) - 1;
        let mut hash = pc;
        for (i, bit) in self
            .bits
            .iter()
            .rev()
            .skip(skip)
            .take(hist_len)
            .enumerate()
        {
            hash ^= u64::from(*bit) << (i as u32 % width);
        }
        hash & mask
    }
}
