//! Bloom filter parameter calculation
//!
//! Formulas:
//! - m = -n*ln(p) / (ln(2)^2)  -- optimal bits
//! - k = (m/n) * ln(2)         -- optimal hash functions
//! - p = (1 - e^(-kn/m))^k     -- false positive rate after n insertions

use std::f64::consts::LN_2;

/// Optimal number of bits for `n` expected insertions at false positive rate `p`
///
/// `p` of zero is clamped to the smallest positive double so the result stays finite.
pub fn optimal_num_of_bits(n: u64, p: f64) -> u64 {
    let p = if p == 0.0 { f64::MIN_POSITIVE } else { p };
    (-(n as f64) * p.ln() / (LN_2 * LN_2)) as u64
}

/// Optimal number of hash functions for `n` insertions into `m` bits, at least 1
pub fn optimal_num_of_hash_functions(n: u64, m: u64) -> u32 {
    if n == 0 {
        return 1;
    }
    ((m as f64 / n as f64 * LN_2).round() as u32).max(1)
}

/// False positive rate after `n` insertions into `m` bits with `k` hash functions
pub fn calculate_fpr(m: u64, n: u64, k: u32) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}

/// Probability of a false positive given the observed fill of the vector
///
/// `(bit_count / bit_size)^k`
pub fn expected_fpp(bit_count: u64, bit_size: u64, k: u32) -> f64 {
    if bit_size == 0 {
        return 1.0;
    }
    (bit_count as f64 / bit_size as f64).powi(k as i32)
}

/// Estimate of distinct elements inserted, from the observed fill
///
/// `-m/k * ln(1 - bit_count/m)` (Swamidass & Baldi). Saturates at `u64::MAX`
/// once every bit is set.
pub fn approximate_element_count(bit_count: u64, bit_size: u64, k: u32) -> u64 {
    if bit_size == 0 || k == 0 {
        return 0;
    }
    let fraction = bit_count as f64 / bit_size as f64;
    let estimate = -(1.0 - fraction).ln() * bit_size as f64 / k as f64;
    if estimate.is_finite() {
        estimate.round() as u64
    } else {
        u64::MAX
    }
}
