//! Remote bit array
//!
//! Translates logical bit operations into bit store calls against the single
//! key derived from a [`FilterIdentity`]. Holds no bits and no counters of its
//! own: every answer comes from the store, so all processes sharing the key
//! see the same vector.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::{FilterIdentity, MAX_BIT_SIZE};
use crate::error::{FilterError, StoreError};
use crate::ports::BitStore;

/// Allocation granularity in bits
pub const WORD_BITS: u64 = 64;

/// A bit vector stored under one key of a [`BitStore`]
pub struct RemoteBitArray<S: BitStore> {
    store: Arc<S>,
    key: String,
    timeout: Option<Duration>,
}

impl<S: BitStore> RemoteBitArray<S> {
    pub fn new(store: Arc<S>, identity: &FilterIdentity) -> Self {
        Self {
            store,
            key: identity.store_key(),
            timeout: None,
        }
    }

    /// Bound every store round-trip by `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| StoreError::Timeout)?,
            None => request.await,
        }
    }

    /// Ensure the vector can address at least `bits` bits
    ///
    /// Rounds up to whole 64-bit words. A vector that is already large enough
    /// is left untouched; otherwise a zero is written at the last required
    /// position, and restored to one if a concurrent writer had set it.
    pub async fn allocate(&self, bits: u64) -> Result<(), FilterError> {
        if bits == 0 {
            return Err(FilterError::InvalidConfiguration(
                "cannot allocate an empty bit vector".to_string(),
            ));
        }
        if bits > MAX_BIT_SIZE {
            return Err(FilterError::InvalidConfiguration(format!(
                "cannot allocate {} bits, maximum is {}",
                bits, MAX_BIT_SIZE
            )));
        }

        let required = bits.div_ceil(WORD_BITS) * WORD_BITS;
        let current = self.bit_size().await?;
        if current >= required {
            debug!(key = %self.key, current, required, "Bit vector already allocated");
            return Ok(());
        }

        let last = required - 1;
        let was_set = self
            .call(self.store.set_bit(&self.key, last, false))
            .await?;
        if was_set {
            warn!(key = %self.key, index = last, "Allocation raced a concurrent set; restoring bit");
            self.call(self.store.set_bit(&self.key, last, true)).await?;
        }

        info!(key = %self.key, bits = required, "Allocated remote bit vector");
        Ok(())
    }

    /// Set the bit at `index`; returns whether it was previously zero
    pub async fn set(&self, index: u64) -> Result<bool, StoreError> {
        let previous = self.call(self.store.set_bit(&self.key, index, true)).await?;
        Ok(!previous)
    }

    pub async fn get(&self, index: u64) -> Result<bool, StoreError> {
        self.call(self.store.get_bit(&self.key, index)).await
    }

    /// Current length of the vector in bits
    pub async fn bit_size(&self) -> Result<u64, StoreError> {
        let bytes = self.call(self.store.str_len(&self.key)).await?;
        bytes.checked_mul(8).ok_or_else(|| {
            StoreError::ProtocolError(format!(
                "store reported {} bytes for '{}', more than a bit offset can address",
                bytes, self.key
            ))
        })
    }

    /// Number of one bits
    ///
    /// A snapshot: concurrent `set` calls from other processes may not be
    /// counted yet, so this can undercount but never overcounts.
    pub async fn bit_count(&self) -> Result<u64, StoreError> {
        self.call(self.store.bit_count(&self.key)).await
    }
}
