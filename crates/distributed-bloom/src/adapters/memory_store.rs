//! In-process bit store
//!
//! Mirrors Redis string semantics so filters behave identically against it:
//! bits are addressed MSB-first within each byte, writing past the end grows
//! the value with zero bytes, and reads past the end return zero.
//!
//! Sharing one `Arc<InMemoryBitStore>` between several filters models several
//! processes sharing one remote store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use bitvec::prelude::*;
use tracing::warn;

use crate::domain::MAX_BIT_SIZE;
use crate::error::StoreError;
use crate::ports::BitStore;

/// Sentinel for "never inject failures"
const NO_FAILURES: i64 = -1;

/// Operation counters, for asserting how many round-trips an operation made
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreCallCounts {
    pub set_bit: u64,
    pub get_bit: u64,
    pub str_len: u64,
    pub bit_count: u64,
}

/// In-memory [`BitStore`] with Redis-compatible bit addressing
pub struct InMemoryBitStore {
    values: RwLock<HashMap<String, BitVec<u8, Msb0>>>,
    /// Calls left before injected failures start; `NO_FAILURES` disables injection
    failure_budget: AtomicI64,
    set_calls: AtomicU64,
    get_calls: AtomicU64,
    strlen_calls: AtomicU64,
    bitcount_calls: AtomicU64,
}

impl Default for InMemoryBitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBitStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            failure_budget: AtomicI64::new(NO_FAILURES),
            set_calls: AtomicU64::new(0),
            get_calls: AtomicU64::new(0),
            strlen_calls: AtomicU64::new(0),
            bitcount_calls: AtomicU64::new(0),
        }
    }

    /// Let the next `calls` operations succeed, then fail every call after them
    pub fn fail_after(&self, calls: u64) {
        let calls = i64::try_from(calls).unwrap_or(i64::MAX);
        self.failure_budget.store(calls, Ordering::SeqCst);
    }

    /// Fail every call until [`InMemoryBitStore::restore`] is called
    pub fn set_unavailable(&self) {
        self.fail_after(0);
    }

    /// Stop injecting failures
    pub fn restore(&self) {
        self.failure_budget.store(NO_FAILURES, Ordering::SeqCst);
    }

    /// Delete a key, as an operator resetting a filter would
    pub fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut values = self.values.write().map_err(|_| poisoned())?;
        Ok(values.remove(key).is_some())
    }

    #[must_use]
    pub fn call_counts(&self) -> StoreCallCounts {
        StoreCallCounts {
            set_bit: self.set_calls.load(Ordering::Relaxed),
            get_bit: self.get_calls.load(Ordering::Relaxed),
            str_len: self.strlen_calls.load(Ordering::Relaxed),
            bit_count: self.bitcount_calls.load(Ordering::Relaxed),
        }
    }

    fn check_available(&self, operation: &'static str) -> Result<(), StoreError> {
        let outcome = self
            .failure_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |budget| match budget {
                NO_FAILURES | 0 => None,
                remaining => Some(remaining - 1),
            });

        match outcome {
            Err(0) => {
                warn!(operation, "Injected bit store failure");
                Err(StoreError::ConnectionError(format!(
                    "store unavailable during {}",
                    operation
                )))
            }
            _ => Ok(()),
        }
    }
}

fn poisoned() -> StoreError {
    StoreError::ProtocolError("store lock poisoned".to_string())
}

fn check_index(index: u64) -> Result<usize, StoreError> {
    if index >= MAX_BIT_SIZE {
        return Err(StoreError::IndexOutOfRange {
            index,
            max: MAX_BIT_SIZE,
        });
    }
    usize::try_from(index).map_err(|_| StoreError::IndexOutOfRange {
        index,
        max: usize::MAX as u64,
    })
}

#[async_trait]
impl BitStore for InMemoryBitStore {
    async fn set_bit(&self, key: &str, index: u64, value: bool) -> Result<bool, StoreError> {
        self.set_calls.fetch_add(1, Ordering::Relaxed);
        self.check_available("SETBIT")?;
        let index = check_index(index)?;

        let mut values = self.values.write().map_err(|_| poisoned())?;
        let bits = values.entry(key.to_string()).or_default();
        if index >= bits.len() {
            // Grow by whole zero bytes
            let bytes = index / 8 + 1;
            bits.resize(bytes * 8, false);
        }

        let previous = bits[index];
        bits.set(index, value);
        Ok(previous)
    }

    async fn get_bit(&self, key: &str, index: u64) -> Result<bool, StoreError> {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        self.check_available("GETBIT")?;
        let index = check_index(index)?;

        let values = self.values.read().map_err(|_| poisoned())?;
        Ok(values
            .get(key)
            .and_then(|bits| bits.get(index).map(|bit| *bit))
            .unwrap_or(false))
    }

    async fn str_len(&self, key: &str) -> Result<u64, StoreError> {
        self.strlen_calls.fetch_add(1, Ordering::Relaxed);
        self.check_available("STRLEN")?;

        let values = self.values.read().map_err(|_| poisoned())?;
        Ok(values.get(key).map_or(0, |bits| (bits.len() / 8) as u64))
    }

    async fn bit_count(&self, key: &str) -> Result<u64, StoreError> {
        self.bitcount_calls.fetch_add(1, Ordering::Relaxed);
        self.check_available("BITCOUNT")?;

        let values = self.values.read().map_err(|_| poisoned())?;
        Ok(values.get(key).map_or(0, |bits| bits.count_ones() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_reads_as_empty() {
        let store = InMemoryBitStore::new();

        assert!(!store.get_bit("k", 10).await.unwrap());
        assert_eq!(store.str_len("k").await.unwrap(), 0);
        assert_eq!(store.bit_count("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_bit_returns_previous_value() {
        let store = InMemoryBitStore::new();

        assert!(!store.set_bit("k", 3, true).await.unwrap());
        assert!(store.set_bit("k", 3, true).await.unwrap());
        assert!(store.set_bit("k", 3, false).await.unwrap());
        assert!(!store.get_bit("k", 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_bit_grows_by_whole_bytes() {
        let store = InMemoryBitStore::new();

        store.set_bit("k", 0, false).await.unwrap();
        assert_eq!(store.str_len("k").await.unwrap(), 1);

        store.set_bit("k", 8, false).await.unwrap();
        assert_eq!(store.str_len("k").await.unwrap(), 2);

        store.set_bit("k", 1023, false).await.unwrap();
        assert_eq!(store.str_len("k").await.unwrap(), 128);
        assert_eq!(store.bit_count("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bits_are_msb_first() {
        let store = InMemoryBitStore::new();
        store.set_bit("k", 0, true).await.unwrap();

        let values = store.values.read().unwrap();
        assert_eq!(values["k"].as_raw_slice(), &[0b1000_0000]);
    }

    #[tokio::test]
    async fn test_rejects_offsets_past_limit() {
        let store = InMemoryBitStore::new();
        let result = store.set_bit("k", MAX_BIT_SIZE, true).await;
        assert!(matches!(result, Err(StoreError::IndexOutOfRange { .. })));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = InMemoryBitStore::new();
        store.fail_after(1);

        assert!(store.set_bit("k", 1, true).await.is_ok());
        assert!(matches!(
            store.get_bit("k", 1).await,
            Err(StoreError::ConnectionError(_))
        ));

        store.restore();
        assert!(store.get_bit("k", 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_resets_key() {
        let store = InMemoryBitStore::new();
        store.set_bit("k", 5, true).await.unwrap();

        assert!(store.remove("k").unwrap());
        assert_eq!(store.bit_count("k").await.unwrap(), 0);
        assert!(!store.remove("k").unwrap());
    }

    #[tokio::test]
    async fn test_call_counts() {
        let store = InMemoryBitStore::new();
        store.set_bit("k", 1, true).await.unwrap();
        store.get_bit("k", 1).await.unwrap();
        store.get_bit("k", 2).await.unwrap();

        let counts = store.call_counts();
        assert_eq!(counts.set_bit, 1);
        assert_eq!(counts.get_bit, 2);
        assert_eq!(counts.str_len, 0);
    }
}
