//! Service Layer
//!
//! Orchestrates domain logic over the remote bit store.

pub mod bit_array;
pub mod bloom_filter;

pub use bit_array::{RemoteBitArray, WORD_BITS};
pub use bloom_filter::DistributedBloomFilter;
