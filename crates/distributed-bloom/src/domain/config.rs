//! Filter configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use distributed_bloom::domain::{FilterConfigBuilder, HashStrategy};
//!
//! let config = FilterConfigBuilder::new()
//!     .num_hash_functions(4)
//!     .bit_size(10_000)
//!     .strategy(HashStrategy::Murmur128Mitz64)
//!     .build()?;
//! ```

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::hash_strategy::HashStrategy;
use super::parameters::{optimal_num_of_bits, optimal_num_of_hash_functions};
use crate::error::FilterError;

/// Largest supported number of hash functions
pub const MAX_HASH_FUNCTIONS: u32 = 255;

/// Largest addressable bit vector (a 512 MiB store value)
pub const MAX_BIT_SIZE: u64 = 1 << 32;

pub const DEFAULT_NUM_HASH_FUNCTIONS: u32 = 4;
pub const DEFAULT_BIT_SIZE: u64 = 1 << 20;

/// Immutable configuration of one distributed filter
///
/// Changing `num_hash_functions`, `bit_size` or `strategy` after elements
/// have been inserted invalidates every earlier membership answer.
///
/// A deserialized config is unvalidated until [`FilterConfig::validate`] runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Number of hash functions (k)
    pub num_hash_functions: u32,
    /// Requested size in bits (m), rounded up to whole 64-bit words on allocation
    pub bit_size: u64,
    /// Index derivation strategy
    #[serde(default)]
    pub strategy: HashStrategy,
    /// Upper bound on each store round-trip; `None` waits indefinitely
    #[serde(default, with = "optional_millis")]
    pub store_timeout: Option<Duration>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            num_hash_functions: DEFAULT_NUM_HASH_FUNCTIONS,
            bit_size: DEFAULT_BIT_SIZE,
            strategy: HashStrategy::default(),
            store_timeout: None,
        }
    }
}

/// `Option<Duration>` as optional milliseconds
mod optional_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(|d| d.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis: Option<u64> = Deserialize::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

impl FilterConfig {
    /// Create a new configuration with validation
    pub fn new(num_hash_functions: u32, bit_size: u64) -> Result<Self, FilterError> {
        let config = Self {
            num_hash_functions,
            bit_size,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Size a filter for `expected_insertions` at false positive rate `fpp`
    pub fn for_expected_insertions(expected_insertions: u64, fpp: f64) -> Result<Self, FilterError> {
        if !(fpp > 0.0 && fpp < 1.0) {
            return Err(FilterError::InvalidConfiguration(format!(
                "false positive probability must be in (0, 1), got {}",
                fpp
            )));
        }

        let n = expected_insertions.max(1);
        let m = optimal_num_of_bits(n, fpp).max(1);
        let k = optimal_num_of_hash_functions(n, m);
        Self::new(k, m)
    }

    /// Create configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// - `DBF_NUM_HASH_FUNCTIONS`: k (default: 4)
    /// - `DBF_BIT_SIZE`: m (default: 1048576)
    /// - `DBF_STRATEGY`: `murmur128_mitz_32` or `murmur128_mitz_64` (default: 64)
    /// - `DBF_STORE_TIMEOUT_MS`: per round-trip timeout (default: none)
    pub fn from_env() -> Result<Self, FilterError> {
        let defaults = Self::default();

        let config = Self {
            num_hash_functions: parse_env("DBF_NUM_HASH_FUNCTIONS")?
                .unwrap_or(defaults.num_hash_functions),
            bit_size: parse_env("DBF_BIT_SIZE")?.unwrap_or(defaults.bit_size),
            strategy: match env::var("DBF_STRATEGY") {
                Ok(name) => HashStrategy::from_name(&name)?,
                Err(_) => defaults.strategy,
            },
            store_timeout: parse_env::<u64>("DBF_STORE_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .or(defaults.store_timeout),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.num_hash_functions == 0 {
            return Err(FilterError::InvalidConfiguration(
                "num_hash_functions must be at least 1".to_string(),
            ));
        }

        if self.num_hash_functions > MAX_HASH_FUNCTIONS {
            return Err(FilterError::InvalidConfiguration(format!(
                "num_hash_functions {} exceeds maximum {}",
                self.num_hash_functions, MAX_HASH_FUNCTIONS
            )));
        }

        if self.bit_size == 0 {
            return Err(FilterError::InvalidConfiguration(
                "bit_size cannot be 0".to_string(),
            ));
        }

        if self.bit_size > MAX_BIT_SIZE {
            return Err(FilterError::InvalidConfiguration(format!(
                "bit_size {} exceeds maximum {}",
                self.bit_size, MAX_BIT_SIZE
            )));
        }

        if self.store_timeout == Some(Duration::ZERO) {
            return Err(FilterError::InvalidConfiguration(
                "store_timeout must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, FilterError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            FilterError::InvalidConfiguration(format!("{}: cannot parse '{}'", name, raw))
        }),
        Err(_) => Ok(None),
    }
}

/// Builder for FilterConfig with validation
#[derive(Default)]
pub struct FilterConfigBuilder {
    num_hash_functions: Option<u32>,
    bit_size: Option<u64>,
    strategy: Option<HashStrategy>,
    store_timeout: Option<Duration>,
}

impl FilterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_hash_functions(mut self, k: u32) -> Self {
        self.num_hash_functions = Some(k);
        self
    }

    pub fn bit_size(mut self, m: u64) -> Self {
        self.bit_size = Some(m);
        self
    }

    pub fn strategy(mut self, strategy: HashStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    /// Build the FilterConfig, validating all parameters
    pub fn build(self) -> Result<FilterConfig, FilterError> {
        let defaults = FilterConfig::default();

        let config = FilterConfig {
            num_hash_functions: self.num_hash_functions.unwrap_or(defaults.num_hash_functions),
            bit_size: self.bit_size.unwrap_or(defaults.bit_size),
            strategy: self.strategy.unwrap_or(defaults.strategy),
            store_timeout: self.store_timeout.or(defaults.store_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FilterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_hash_functions() {
        let result = FilterConfig::new(0, 1000);
        assert!(matches!(result, Err(FilterError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_rejects_too_many_hash_functions() {
        assert!(FilterConfig::new(MAX_HASH_FUNCTIONS, 1000).is_ok());
        assert!(FilterConfig::new(MAX_HASH_FUNCTIONS + 1, 1000).is_err());
    }

    #[test]
    fn test_rejects_zero_and_oversized_bit_size() {
        assert!(FilterConfig::new(4, 0).is_err());
        assert!(FilterConfig::new(4, MAX_BIT_SIZE).is_ok());
        assert!(FilterConfig::new(4, MAX_BIT_SIZE + 1).is_err());
    }

    #[test]
    fn test_builder_creates_valid_config() {
        let config = FilterConfigBuilder::new()
            .num_hash_functions(7)
            .bit_size(50_000)
            .strategy(HashStrategy::Murmur128Mitz32)
            .store_timeout(Duration::from_millis(250))
            .build()
            .expect("Should create valid config");

        assert_eq!(config.num_hash_functions, 7);
        assert_eq!(config.bit_size, 50_000);
        assert_eq!(config.strategy, HashStrategy::Murmur128Mitz32);
        assert_eq!(config.store_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_builder_uses_defaults() {
        let config = FilterConfigBuilder::new().bit_size(1000).build().unwrap();
        assert_eq!(config.num_hash_functions, DEFAULT_NUM_HASH_FUNCTIONS);
        assert_eq!(config.strategy, HashStrategy::Murmur128Mitz64);
        assert_eq!(config.store_timeout, None);
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let result = FilterConfigBuilder::new()
            .store_timeout(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_for_expected_insertions() {
        let config = FilterConfig::for_expected_insertions(1000, 0.01).unwrap();
        assert!((9000..=10_000).contains(&config.bit_size));
        assert_eq!(config.num_hash_functions, 7);

        assert!(FilterConfig::for_expected_insertions(1000, 0.0).is_err());
        assert!(FilterConfig::for_expected_insertions(1000, 1.0).is_err());
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{"num_hash_functions": 4, "bit_size": 1000, "store_timeout": 500}"#;
        let config: FilterConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.strategy, HashStrategy::Murmur128Mitz64);
        assert_eq!(config.store_timeout, Some(Duration::from_millis(500)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_does_not_validate() {
        let json = r#"{"num_hash_functions": 0, "bit_size": 1000}"#;
        let config: FilterConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.num_hash_functions, 0);
        assert!(matches!(
            config.validate(),
            Err(FilterError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_from_env() {
        // Only this test touches DBF_* variables
        env::set_var("DBF_NUM_HASH_FUNCTIONS", "6");
        env::set_var("DBF_BIT_SIZE", "4096");
        env::set_var("DBF_STRATEGY", "murmur128_mitz_32");
        env::set_var("DBF_STORE_TIMEOUT_MS", "100");

        let config = FilterConfig::from_env().unwrap();
        assert_eq!(config.num_hash_functions, 6);
        assert_eq!(config.bit_size, 4096);
        assert_eq!(config.strategy, HashStrategy::Murmur128Mitz32);
        assert_eq!(config.store_timeout, Some(Duration::from_millis(100)));

        env::set_var("DBF_BIT_SIZE", "lots");
        assert!(matches!(
            FilterConfig::from_env(),
            Err(FilterError::InvalidConfiguration(_))
        ));

        for name in [
            "DBF_NUM_HASH_FUNCTIONS",
            "DBF_BIT_SIZE",
            "DBF_STRATEGY",
            "DBF_STORE_TIMEOUT_MS",
        ] {
            env::remove_var(name);
        }
        assert_eq!(FilterConfig::from_env().unwrap(), FilterConfig::default());
    }
}
