//! Domain Layer - Pure logic
//!
//! This layer contains:
//! - Funnels (element encoding)
//! - Hash strategies (index derivation)
//! - Filter identity and store key rendering
//! - Parameter calculations
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Pure functions where possible

pub mod config;
pub mod funnel;
pub mod hash_strategy;
pub mod identity;
pub mod parameters;

pub use config::{FilterConfig, FilterConfigBuilder, MAX_BIT_SIZE, MAX_HASH_FUNCTIONS};
pub use funnel::{BytesFunnel, Funnel, I32Funnel, I64Funnel, SerdeFunnel, StringFunnel};
pub use hash_strategy::{murmur_hash128, HashStrategy};
pub use identity::FilterIdentity;
pub use parameters::{
    approximate_element_count, calculate_fpr, expected_fpp, optimal_num_of_bits,
    optimal_num_of_hash_functions,
};
