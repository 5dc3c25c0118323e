//! Redis-backed bit store
//!
//! Maps the four store operations one-to-one onto `SETBIT`, `GETBIT`,
//! `STRLEN` and `BITCOUNT`. Connection handling (reconnects, multiplexing)
//! is delegated to the redis crate's connection manager.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::ports::BitStore;

/// [`BitStore`] over a Redis (or Redis-protocol) server
#[derive(Clone)]
pub struct RedisBitStore {
    connection: ConnectionManager,
}

impl RedisBitStore {
    /// Connect to `url`, e.g. `redis://localhost:6379`
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(map_redis_error)?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        debug!(url = url, "Connected to Redis bit store");
        Ok(Self { connection })
    }

    /// Wrap an existing connection manager
    pub fn from_connection(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

fn map_redis_error(err: RedisError) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        StoreError::ConnectionError(err.to_string())
    } else {
        warn!(error = %err, "Redis rejected bit store command");
        StoreError::ProtocolError(err.to_string())
    }
}

#[async_trait]
impl BitStore for RedisBitStore {
    async fn set_bit(&self, key: &str, index: u64, value: bool) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let previous: u8 = redis::cmd("SETBIT")
            .arg(key)
            .arg(index)
            .arg(u8::from(value))
            .query_async(&mut connection)
            .await
            .map_err(map_redis_error)?;
        Ok(previous == 1)
    }

    async fn get_bit(&self, key: &str, index: u64) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let bit: u8 = redis::cmd("GETBIT")
            .arg(key)
            .arg(index)
            .query_async(&mut connection)
            .await
            .map_err(map_redis_error)?;
        Ok(bit == 1)
    }

    async fn str_len(&self, key: &str) -> Result<u64, StoreError> {
        let mut connection = self.connection.clone();
        redis::cmd("STRLEN")
            .arg(key)
            .query_async(&mut connection)
            .await
            .map_err(map_redis_error)
    }

    async fn bit_count(&self, key: &str) -> Result<u64, StoreError> {
        let mut connection = self.connection.clone();
        redis::cmd("BITCOUNT")
            .arg(key)
            .query_async(&mut connection)
            .await
            .map_err(map_redis_error)
    }
}
