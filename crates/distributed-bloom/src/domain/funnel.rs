//! Funnels: deterministic element-to-bytes encoders used as hash input
//!
//! The remote bit vector outlives any single process, so an encoding must
//! never change once a filter is in use. All fixed-width integers are
//! little-endian.

use std::marker::PhantomData;

use serde::Serialize;

use crate::error::FilterError;

/// Encodes elements of type `T` into the bytes that get hashed
pub trait Funnel<T: ?Sized>: Send + Sync {
    fn encode(&self, element: &T) -> Result<Vec<u8>, FilterError>;
}

/// UTF-8 bytes of a string
#[derive(Clone, Copy, Debug, Default)]
pub struct StringFunnel;

impl Funnel<str> for StringFunnel {
    fn encode(&self, element: &str) -> Result<Vec<u8>, FilterError> {
        Ok(element.as_bytes().to_vec())
    }
}

impl Funnel<String> for StringFunnel {
    fn encode(&self, element: &String) -> Result<Vec<u8>, FilterError> {
        Ok(element.as_bytes().to_vec())
    }
}

/// Raw bytes, passed through unchanged
#[derive(Clone, Copy, Debug, Default)]
pub struct BytesFunnel;

impl Funnel<[u8]> for BytesFunnel {
    fn encode(&self, element: &[u8]) -> Result<Vec<u8>, FilterError> {
        Ok(element.to_vec())
    }
}

impl Funnel<Vec<u8>> for BytesFunnel {
    fn encode(&self, element: &Vec<u8>) -> Result<Vec<u8>, FilterError> {
        Ok(element.clone())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct I32Funnel;

impl Funnel<i32> for I32Funnel {
    fn encode(&self, element: &i32) -> Result<Vec<u8>, FilterError> {
        Ok(element.to_le_bytes().to_vec())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct I64Funnel;

impl Funnel<i64> for I64Funnel {
    fn encode(&self, element: &i64) -> Result<Vec<u8>, FilterError> {
        Ok(element.to_le_bytes().to_vec())
    }
}

/// Encodes any `Serialize` value with bincode
///
/// Serializer failures (e.g. a custom `Serialize` impl rejecting a value)
/// surface as [`FilterError::EncodingError`].
pub struct SerdeFunnel<T: ?Sized> {
    _marker: PhantomData<fn(&T)>,
}

impl<T: ?Sized> SerdeFunnel<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> Default for SerdeFunnel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for SerdeFunnel<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for SerdeFunnel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SerdeFunnel")
    }
}

impl<T: Serialize + ?Sized> Funnel<T> for SerdeFunnel<T> {
    fn encode(&self, element: &T) -> Result<Vec<u8>, FilterError> {
        bincode::serialize(element).map_err(|e| FilterError::EncodingError(e.to_string()))
    }
}
