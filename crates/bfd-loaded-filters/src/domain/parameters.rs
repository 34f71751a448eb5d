//! Filter sizing
//!
//! For `n` expected subjects and target false positive rate `p`:
//! - bits   `m = ceil(-n ln p / ln²2)`
//! - hashes `k = round(m / n * ln 2)`
//! - rate   `(1 - e^(-kn/m))^k`

use std::f64::consts::LN_2;

/// Upper bound on the number of hash functions.
pub const MAX_HASH_COUNT: usize = 32;

/// Largest bit array handed out (256 MiB).
pub const MAX_SIZE_BITS: usize = 1 << 31;

/// Target rates are clamped into `[MIN_TARGET_FPR, MAX_TARGET_FPR]`.
pub const MIN_TARGET_FPR: f64 = 1e-12;
pub const MAX_TARGET_FPR: f64 = 0.999;

/// Smallest bit array handed out. Tiny files (one batch, one subject) would
/// otherwise get a 10-bit array whose false positive rate sits at the target.
pub const MIN_SIZE_BITS: usize = 64;

/// Bit array length and probe count for one filter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSizing {
    pub bits: usize,
    pub hashes: usize,
    /// Rate predicted for exactly the expected subject count
    pub expected_fpr: f64,
}

/// Size a filter for `expected_subjects` at `target_fpr`.
///
/// An estimate of zero is sized as one subject. Estimates only drive sizing,
/// so an undercount raises the false positive rate but never drops a member.
/// The bit array never exceeds [`MAX_SIZE_BITS`]; a rate outside `(0, 1)`
/// (or NaN) is clamped first.
pub fn size_for(expected_subjects: usize, target_fpr: f64) -> FilterSizing {
    let n = expected_subjects.max(1);
    let p = clamp_fpr(target_fpr);
    let wanted = (-(n as f64) * p.ln() / (LN_2 * LN_2)).ceil();
    let raw_bits = (wanted.min(MAX_SIZE_BITS as f64) as usize).max(1);

    let hashes = hashes_for(raw_bits, n).clamp(1, MAX_HASH_COUNT);
    let bits = raw_bits.max(MIN_SIZE_BITS);

    FilterSizing {
        bits,
        hashes,
        expected_fpr: predicted_fpr(bits, n, hashes),
    }
}

fn clamp_fpr(target_fpr: f64) -> f64 {
    if target_fpr.is_nan() {
        MIN_TARGET_FPR
    } else {
        target_fpr.clamp(MIN_TARGET_FPR, MAX_TARGET_FPR)
    }
}

/// `(1 - e^(-kn/m))^k`; 1.0 for an empty bit array.
pub fn predicted_fpr(bits: usize, subjects: usize, hashes: usize) -> f64 {
    if bits == 0 {
        return 1.0;
    }
    let fill = 1.0 - (-(hashes as f64) * (subjects as f64) / bits as f64).exp();
    fill.powi(hashes as i32)
}

/// `round(m / n * ln 2)`, or 1 when there are no subjects.
pub fn hashes_for(bits: usize, subjects: usize) -> usize {
    if subjects == 0 {
        return 1;
    }
    (bits as f64 / subjects as f64 * LN_2).round() as usize
}
