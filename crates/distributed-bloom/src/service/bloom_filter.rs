//! Distributed Bloom filter
//!
//! Combines a [`HashStrategy`](crate::domain::HashStrategy) with a
//! [`RemoteBitArray`] under one identity and configuration.
//!
//! INVARIANTS:
//! - No false negatives: once `put(e)` returns `Ok`, `might_contain(e)` is true
//!   for every process sharing the identity (bits are never cleared).
//! - Indices depend on the vector length reported by the store, so every
//!   process sharing a key derives the same indices for the same element.
//!
//! The k bit writes of one `put` are neither batched nor transactional.
//! Readers may observe some of them before others, which can only delay a
//! positive answer for the element being inserted.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::bit_array::RemoteBitArray;
use crate::domain::parameters::{approximate_element_count, expected_fpp};
use crate::domain::{FilterConfig, FilterIdentity, Funnel, HashStrategy};
use crate::error::{FilterError, StoreError};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{BitStore, MembershipFilter};

/// Bloom filter whose bits live in a shared [`BitStore`]
pub struct DistributedBloomFilter<T: ?Sized, F, S: BitStore> {
    config: FilterConfig,
    identity: FilterIdentity,
    funnel: F,
    bits: RemoteBitArray<S>,
    metrics: Arc<dyn MetricsRecorder>,
    _element: PhantomData<fn(&T)>,
}

impl<T, F, S> DistributedBloomFilter<T, F, S>
where
    T: ?Sized,
    F: Funnel<T>,
    S: BitStore,
{
    /// Validate the configuration and allocate the remote vector
    pub async fn new(
        store: Arc<S>,
        identity: FilterIdentity,
        config: FilterConfig,
        funnel: F,
    ) -> Result<Self, FilterError> {
        Self::new_with_metrics(store, identity, config, funnel, Arc::new(NoOpMetrics)).await
    }

    pub async fn new_with_metrics(
        store: Arc<S>,
        identity: FilterIdentity,
        config: FilterConfig,
        funnel: F,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Result<Self, FilterError> {
        config.validate()?;
        identity.validate()?;

        let bits = RemoteBitArray::new(store, &identity).with_timeout(config.store_timeout);
        if let Err(e) = bits.allocate(config.bit_size).await {
            if e.is_store_error() {
                metrics.record_store_error();
            }
            return Err(e);
        }
        metrics.record_filter_created();

        info!(
            key = %bits.key(),
            k = config.num_hash_functions,
            m = config.bit_size,
            strategy = ?config.strategy,
            "Distributed Bloom filter ready"
        );

        Ok(Self {
            config,
            identity,
            funnel,
            bits,
            metrics,
            _element: PhantomData,
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn identity(&self) -> &FilterIdentity {
        &self.identity
    }

    pub fn strategy(&self) -> HashStrategy {
        self.config.strategy
    }

    pub fn store_key(&self) -> &str {
        self.bits.key()
    }

    /// Encode `element` and derive its k indices against the current vector length
    ///
    /// Encoding happens first, so an unencodable element never reaches the store.
    async fn bit_indices(&self, element: &T) -> Result<Vec<u64>, FilterError> {
        let bytes = self.funnel.encode(element)?;
        let m = self.bits.bit_size().await?;
        if m == 0 {
            return Err(StoreError::ProtocolError(format!(
                "bit vector '{}' is missing from the store",
                self.bits.key()
            ))
            .into());
        }
        Ok(self
            .config
            .strategy
            .bit_indices(&bytes, self.config.num_hash_functions as usize, m))
    }

    async fn set_all(&self, indices: &[u64]) -> Result<bool, FilterError> {
        let mut changed = false;
        for &index in indices {
            changed |= self.bits.set(index).await?;
        }
        Ok(changed)
    }

    async fn all_set(&self, indices: &[u64]) -> Result<bool, FilterError> {
        for &index in indices {
            if !self.bits.get(index).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn observe_error<R>(
        &self,
        operation: &'static str,
        result: Result<R, FilterError>,
    ) -> Result<R, FilterError> {
        if let Err(e) = &result {
            if e.is_store_error() {
                self.metrics.record_store_error();
            }
            warn!(key = %self.bits.key(), operation, error = %e, "Filter operation failed");
        }
        result
    }

    /// Record `element`; returns whether any of its bits changed
    ///
    /// Bits written before a store failure stay written.
    pub async fn put(&self, element: &T) -> Result<bool, FilterError> {
        let start = Instant::now();
        let result = match self.bit_indices(element).await {
            Ok(indices) => self.set_all(&indices).await,
            Err(e) => Err(e),
        };
        let changed = self.observe_error("put", result)?;

        self.metrics.record_insert(start.elapsed(), changed);
        debug!(key = %self.bits.key(), changed, "put");
        Ok(changed)
    }

    /// Whether `element` might have been recorded
    ///
    /// Stops at the first unset bit.
    pub async fn might_contain(&self, element: &T) -> Result<bool, FilterError> {
        let start = Instant::now();
        let result = match self.bit_indices(element).await {
            Ok(indices) => self.all_set(&indices).await,
            Err(e) => Err(e),
        };
        let found = self.observe_error("might_contain", result)?;

        self.metrics.record_lookup(start.elapsed(), found);
        debug!(key = %self.bits.key(), found, "might_contain");
        Ok(found)
    }

    /// Test `element` and record it when absent; returns whether it was present
    ///
    /// Not atomic: concurrent callers racing on a new element may all get
    /// `false` and all insert it, which is harmless since inserts are idempotent.
    pub async fn check_and_add(&self, element: &T) -> Result<bool, FilterError> {
        let start = Instant::now();
        let indices = self.observe_error("check_and_add", self.bit_indices(element).await)?;

        let existed = self.observe_error("check_and_add", self.all_set(&indices).await)?;
        self.metrics.record_lookup(start.elapsed(), existed);
        if existed {
            debug!(key = %self.bits.key(), existed, "check_and_add");
            return Ok(true);
        }

        let insert_start = Instant::now();
        let changed = self.observe_error("check_and_add", self.set_all(&indices).await)?;
        self.metrics.record_insert(insert_start.elapsed(), changed);
        debug!(key = %self.bits.key(), existed, changed, "check_and_add");
        Ok(false)
    }

    /// Current vector length in bits, as reported by the store
    pub async fn bit_size(&self) -> Result<u64, FilterError> {
        Ok(self.bits.bit_size().await?)
    }

    /// Number of set bits; an estimate under concurrent writers
    pub async fn bit_count(&self) -> Result<u64, FilterError> {
        Ok(self.bits.bit_count().await?)
    }

    /// Probability that `might_contain` wrongly answers true for a new element
    pub async fn expected_fpp(&self) -> Result<f64, FilterError> {
        let bit_count = self.bits.bit_count().await?;
        let bit_size = self.bits.bit_size().await?;
        Ok(expected_fpp(bit_count, bit_size, self.config.num_hash_functions))
    }

    /// Estimated number of distinct elements recorded by all processes
    pub async fn approximate_element_count(&self) -> Result<u64, FilterError> {
        let bit_count = self.bits.bit_count().await?;
        let bit_size = self.bits.bit_size().await?;
        Ok(approximate_element_count(
            bit_count,
            bit_size,
            self.config.num_hash_functions,
        ))
    }
}

#[async_trait]
impl<T, F, S> MembershipFilter<T> for DistributedBloomFilter<T, F, S>
where
    T: ?Sized + Sync,
    F: Funnel<T>,
    S: BitStore,
{
    async fn put(&self, element: &T) -> Result<bool, FilterError> {
        DistributedBloomFilter::put(self, element).await
    }

    async fn might_contain(&self, element: &T) -> Result<bool, FilterError> {
        DistributedBloomFilter::might_contain(self, element).await
    }

    async fn check_and_add(&self, element: &T) -> Result<bool, FilterError> {
        DistributedBloomFilter::check_and_add(self, element).await
    }
}
