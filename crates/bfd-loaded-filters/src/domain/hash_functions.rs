//! Hash functions for the subject Bloom filter
//!
//! One MurmurHash3 x64-128 digest per element, split into two 64-bit halves
//! for Kirsch-Mitzenmacker double hashing.

use std::io::Cursor;

/// Seed shared by every filter so positions are stable across rebuilds.
pub const HASH_SEED: u32 = 0x5bd1_e995;

/// Hash an element with MurmurHash3 x64-128, returning `(low, high)` halves.
pub fn murmur_hash_pair(element: &[u8], seed: u32) -> (u64, u64) {
    let mut cursor = Cursor::new(element);
    // Reading from an in-memory cursor cannot fail.
    let hash = murmur3::murmur3_x64_128(&mut cursor, seed).unwrap_or(0);
    (hash as u64, (hash >> 64) as u64)
}

/// Compute k bit positions for an element in a filter of m bits
///
/// Double hashing: g(i) = h1 + i * h2 (mod m). `h2` is forced odd so the
/// probe sequence never collapses onto a single position.
pub fn compute_hash_positions(element: &[u8], k: usize, m: usize) -> impl Iterator<Item = usize> {
    let (h1, h2) = murmur_hash_pair(element, HASH_SEED);
    let h2 = h2 | 1;
    let m = m.max(1) as u64;

    (0..k as u64).map(move |i| (h1.wrapping_add(i.wrapping_mul(h2)) % m) as usize)
}
