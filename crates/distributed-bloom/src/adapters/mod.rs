//! Adapters Layer (Driven Adapters)
//!
//! Implementations of the [`BitStore`](crate::ports::BitStore) port.
//!
//! ## Adapters
//!
//! - `InMemoryBitStore` - Process-local store with Redis bit semantics
//! - `RedisBitStore` - Redis client (requires the `redis` feature)

pub mod memory_store;
#[cfg(feature = "redis")]
pub mod redis_store;

pub use memory_store::{InMemoryBitStore, StoreCallCounts};
#[cfg(feature = "redis")]
pub use redis_store::RedisBitStore;
