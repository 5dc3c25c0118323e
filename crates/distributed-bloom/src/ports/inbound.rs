//! Inbound Ports (Driving Ports)
//!
//! The membership API that callers program against.

use async_trait::async_trait;

use crate::error::FilterError;

/// Probabilistic membership API (Driving Port)
///
/// Answers may be false positives but never false negatives for elements
/// whose `put` completed.
#[async_trait]
pub trait MembershipFilter<T: ?Sized + Sync>: Send + Sync {
    /// Record `element`; returns whether any bit changed
    async fn put(&self, element: &T) -> Result<bool, FilterError>;

    /// Whether `element` might have been recorded
    async fn might_contain(&self, element: &T) -> Result<bool, FilterError>;

    /// Test `element`, recording it if absent; returns whether it was present
    ///
    /// The test and the insert are not atomic.
    async fn check_and_add(&self, element: &T) -> Result<bool, FilterError>;
}
