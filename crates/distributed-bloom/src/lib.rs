//! # Distributed Bloom
//!
//! Bloom filters whose bit vector lives in a shared, bit-addressable remote
//! store (Redis `SETBIT`/`GETBIT`/`STRLEN`/`BITCOUNT` or anything with the same
//! four operations). Every process that opens a filter with the same identity
//! reads and writes the same bits.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `Funnel`: Element-to-bytes encoding
//!   - `HashStrategy`: Derives k bit indices from a 128-bit MurmurHash3
//!   - `FilterIdentity`: Renders the store key
//!   - `FilterConfig`: Configuration with validation
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `MembershipFilter`: Driving port (inbound API)
//!   - `BitStore`: Driven port (the remote store)
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `RemoteBitArray`: Bit operations against one store key
//!   - `DistributedBloomFilter`: Implements `MembershipFilter`
//!
//! - **Adapters Layer** (`adapters/`): Store implementations
//!   - `InMemoryBitStore`: Process-local store with Redis bit semantics
//!   - `RedisBitStore`: Redis client (`redis` feature)
//!
//! ## Invariants
//!
//! - **No false negatives**: after `put(e)` succeeds, `might_contain(e)` is true
//! - **Determinism**: fixed `(k, m, strategy)` always yields the same k indices
//! - **Monotonicity**: bits are never cleared, so `bit_count()` never decreases
//!
//! FPR after n distinct inserts is approximately `(1 - e^(-kn/m))^k`.
//!
//! ## Usage Example
//!
//! ```ignore
//! use distributed_bloom::{
//!     DistributedBloomFilter, FilterConfig, FilterIdentity, InMemoryBitStore, StringFunnel,
//! };
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryBitStore::new());
//! let filter = DistributedBloomFilter::<str, _, _>::new(
//!     store,
//!     FilterIdentity::new("promo", "test")?,
//!     FilterConfig::new(4, 1000)?,
//!     StringFunnel,
//! )
//! .await?;
//!
//! filter.put("apple").await?;
//! assert!(filter.might_contain("apple").await?);
//! assert!(!filter.check_and_add("banana").await?);
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::InMemoryBitStore;
#[cfg(feature = "redis")]
pub use adapters::RedisBitStore;
pub use domain::{
    BytesFunnel, FilterConfig, FilterConfigBuilder, FilterIdentity, Funnel, HashStrategy,
    I32Funnel, I64Funnel, SerdeFunnel, StringFunnel,
};
pub use error::{FilterError, StoreError};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{BitStore, MembershipFilter};
pub use service::{DistributedBloomFilter, RemoteBitArray};
