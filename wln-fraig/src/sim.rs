//! Simulation vectors and their hashes (spec §4.E "Simulation model").
//!
//! Each node's simulation words are stored once, in the node's own
//! (uncomplemented) polarity, at creation time — since the AIG is built
//! bottom-up via hash-consing, a node's fanins already carry their final
//! vectors when the node is created. A literal's *effective* word is
//! derived on read by XOR-ing with its complement bit, which gives the
//! same polarity-sharing the ABC original achieves with a dedicated
//! `pNode->fInv` flag (spec: "the polarity-invariance flag ... is
//! propagated so that a node and its complement share the same stored
//! vector") without needing a second mutable flag to keep in sync.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Word width of the simulator; `u64` lanes, 64 simulated patterns per
/// word.
pub const WORD_BITS: usize = 64;

/// A pseudo-random generator dedicated to seeding new PIs' random
/// simulation words, so the AIG's random vectors are fully determined by
/// a single seed (spec §5: deterministic, reproducible runs).
pub struct RandSource {
    rng: StdRng,
}

impl RandSource {
    /// Build a source from an explicit seed.
    pub fn new(seed: u64) -> Self {
        RandSource {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Fill `n` fresh random words.
    pub fn words(&mut self, n: usize) -> Vec<u64> {
        (0..n).map(|_| self.rng.next_u64()).collect()
    }
}

/// Fold a vector of words into a single hash value. Not cryptographic;
/// only needs to bucket equal vectors together and spread unequal ones,
/// matching the original's simple multiplicative folding
/// (`fraigTable.c`'s bucket hash).
pub fn fold_hash(words: &[u64]) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325; // FNV offset basis, reused as a fold seed
    for &w in words {
        h ^= w;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}

/// Popcount across a word vector — used to classify a node's random
/// simulation as "sparse" (all-zero or all-one), spec §4.E `TableF0`.
pub fn popcount(words: &[u64]) -> u64 {
    words.iter().map(|w| w.count_ones() as u64).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_hash_is_deterministic() {
        let a = fold_hash(&[1, 2, 3]);
        let b = fold_hash(&[1, 2, 3]);
        assert_eq!(a, b);
        let c = fold_hash(&[1, 2, 4]);
        assert_ne!(a, c);
    }

    #[test]
    fn popcount_all_zero_and_all_one() {
        assert_eq!(popcount(&[0, 0]), 0);
        assert_eq!(popcount(&[u64::MAX, u64::MAX]), 128);
    }

    #[test]
    fn rand_source_is_seed_deterministic() {
        let mut a = RandSource::new(42);
        let mut b = RandSource::new(42);
        assert_eq!(a.words(4), b.words(4));
    }
}
