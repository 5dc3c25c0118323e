//! Hash strategies for mapping an element onto k bit indices
//!
//! Both strategies derive k indices from one 128-bit MurmurHash3 using
//! Kirsch-Mitzenmacher double hashing: h(i) = h1 + i * h2.
//!
//! The variants are append-only. Their ordinals and arithmetic are part of
//! the shared remote state: changing either silently moves every element of
//! every existing filter to different bits.

use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Seed used for the 128-bit MurmurHash3 of every element
pub const MURMUR_SEED: u32 = 0;

/// Index derivation strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashStrategy {
    /// Two 32-bit halves of the low 64 hash bits; negatives are complemented.
    Murmur128Mitz32,
    /// Both 64-bit halves of the hash; negatives have their sign bit masked.
    #[default]
    Murmur128Mitz64,
}

impl HashStrategy {
    /// Stable ordinal, suitable for persisting which strategy a filter uses
    pub fn ordinal(self) -> u8 {
        match self {
            HashStrategy::Murmur128Mitz32 => 0,
            HashStrategy::Murmur128Mitz64 => 1,
        }
    }

    /// Inverse of [`HashStrategy::ordinal`]
    pub fn from_ordinal(ordinal: u8) -> Result<Self, FilterError> {
        match ordinal {
            0 => Ok(HashStrategy::Murmur128Mitz32),
            1 => Ok(HashStrategy::Murmur128Mitz64),
            other => Err(FilterError::InvalidConfiguration(format!(
                "unknown hash strategy ordinal {}",
                other
            ))),
        }
    }

    /// Parse the snake_case name used in configuration
    pub fn from_name(name: &str) -> Result<Self, FilterError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "murmur128_mitz_32" | "murmur128_mitz32" => Ok(HashStrategy::Murmur128Mitz32),
            "murmur128_mitz_64" | "murmur128_mitz64" => Ok(HashStrategy::Murmur128Mitz64),
            other => Err(FilterError::InvalidConfiguration(format!(
                "unknown hash strategy '{}'",
                other
            ))),
        }
    }

    /// Compute the k bit indices of `element` for a vector of `m` bits
    ///
    /// Callers guarantee `k >= 1` and `m > 0`; every index is `< m`.
    pub fn bit_indices(self, element: &[u8], k: usize, m: u64) -> Vec<u64> {
        let hash = murmur_hash128(element);
        match self {
            HashStrategy::Murmur128Mitz32 => mitz32_indices(hash, k, m),
            HashStrategy::Murmur128Mitz64 => mitz64_indices(hash, k, m),
        }
    }
}

/// 128-bit MurmurHash3 (x64 variant) of `element`
///
/// The low 64 bits are the first half of the digest, the high 64 the second.
pub fn murmur_hash128(element: &[u8]) -> u128 {
    let mut cursor = Cursor::new(element);
    // Reading from an in-memory slice cannot fail
    murmur3::murmur3_x64_128(&mut cursor, MURMUR_SEED).unwrap_or(0)
}

fn mitz32_indices(hash: u128, k: usize, m: u64) -> Vec<u64> {
    let hash64 = hash as u64;
    let h1 = hash64 as i32;
    let h2 = (hash64 >> 32) as i32;

    (1..=k)
        .map(|i| {
            let mut combined = h1.wrapping_add((i as i32).wrapping_mul(h2));
            if combined < 0 {
                combined = !combined;
            }
            combined as u64 % m
        })
        .collect()
}

fn mitz64_indices(hash: u128, k: usize, m: u64) -> Vec<u64> {
    let h1 = hash as u64 as i64;
    let h2 = (hash >> 64) as u64 as i64;

    let mut combined = h1;
    let mut indices = Vec::with_capacity(k);
    for _ in 0..k {
        indices.push((combined & i64::MAX) as u64 % m);
        combined = combined.wrapping_add(h2);
    }
    indices
}
