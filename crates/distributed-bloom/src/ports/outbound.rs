//! Outbound Ports (Driven Ports)
//!
//! The bit-addressable store the filter delegates its bit vector to.

use async_trait::async_trait;

use crate::error::StoreError;

/// Bit-addressable keyed store (Driven Port)
///
/// Any service exposing these four operations on a keyed byte vector can back
/// a distributed filter, e.g. Redis `SETBIT`/`GETBIT`/`STRLEN`/`BITCOUNT`.
/// Implementations must apply `set_bit` atomically per bit; no other
/// coordination is expected of them.
#[async_trait]
pub trait BitStore: Send + Sync {
    /// Write `value` at `index`, growing the vector with zero bytes if needed
    ///
    /// Returns the previous value of the bit.
    async fn set_bit(&self, key: &str, index: u64, value: bool) -> Result<bool, StoreError>;

    /// Read the bit at `index`; bits past the end read as zero
    async fn get_bit(&self, key: &str, index: u64) -> Result<bool, StoreError>;

    /// Byte length of the stored vector, zero if the key does not exist
    async fn str_len(&self, key: &str) -> Result<u64, StoreError>;

    /// Number of one bits in the stored vector
    async fn bit_count(&self, key: &str) -> Result<u64, StoreError>;
}
