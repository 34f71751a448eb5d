//! Subject membership filter
//!
//! A fixed-size Bloom filter over subject ids. `might_contain` never returns
//! `false` for an added subject. There is no removal; filters are rebuilt,
//! never shrunk in place.

use bitvec::prelude::*;

use super::hash_functions::compute_hash_positions;
use super::parameters::{predicted_fpr, size_for};

#[derive(Clone, Debug)]
pub struct BloomFilter {
    bits: BitVec<u8, Lsb0>,
    hashes: usize,
    /// `add` calls so far, duplicates included
    added: usize,
}

impl BloomFilter {
    /// Filter with an explicit bit length and probe count, each at least 1.
    pub fn new(bits: usize, hashes: usize) -> Self {
        Self {
            bits: bitvec![u8, Lsb0; 0; bits.max(1)],
            hashes: hashes.max(1),
            added: 0,
        }
    }

    /// Filter sized for `expected_subjects` at `target_fpr`.
    pub fn with_capacity(expected_subjects: usize, target_fpr: f64) -> Self {
        let sizing = size_for(expected_subjects, target_fpr);
        Self::new(sizing.bits, sizing.hashes)
    }

    pub fn add(&mut self, subject_id: &str) {
        let len = self.bits.len();
        for pos in compute_hash_positions(subject_id.as_bytes(), self.hashes, len) {
            self.bits.set(pos, true);
        }
        self.added += 1;
    }

    /// `false` means the subject was definitely never added.
    pub fn might_contain(&self, subject_id: &str) -> bool {
        compute_hash_positions(subject_id.as_bytes(), self.hashes, self.bits.len())
            .all(|pos| self.bits[pos])
    }

    /// Predicted false positive rate at the current fill.
    pub fn false_positive_rate(&self) -> f64 {
        predicted_fpr(self.bits.len(), self.added, self.hashes)
    }

    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn size_bits(&self) -> usize {
        self.bits.len()
    }

    pub fn hash_count(&self) -> usize {
        self.hashes
    }

    pub fn subjects_added(&self) -> usize {
        self.added
    }

    /// Heap footprint of the bit array.
    pub fn size_bytes(&self) -> usize {
        self.bits.as_raw_slice().len()
    }
}
