//! Key-value backend trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::StoreError;

/// A durable string-to-string mapping with an atomic counter primitive.
///
/// Implementations are shared across concurrent requests and must do their
/// own internal synchronization. A backend is constructed (and its
/// connection established) by the composition root, then lives until
/// [`KvBackend::close`] is called.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Short label used in logs ("lmdb", "memory", "rest").
    fn name(&self) -> &'static str;

    /// Fetch the value stored at `key`. A missing key is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value stored at `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Atomically add 1 to the counter at `key` and return the new value.
    ///
    /// An absent key counts as 0. Concurrent callers on the same key always
    /// observe distinct, consecutive results.
    async fn increment(&self, key: &str) -> Result<u64, StoreError>;

    /// Release the underlying connection or file handle.
    ///
    /// Idempotent. Every operation after `close` fails with
    /// [`StoreError::Closed`].
    async fn close(&self) -> Result<(), StoreError>;
}

/// The handle type passed between crates.
pub type SharedBackend = Arc<dyn KvBackend>;

/// Parse a stored counter value, treating a missing value as 0.
pub fn parse_counter(key: &str, raw: Option<&str>) -> Result<u64, StoreError> {
    match raw {
        None => Ok(0),
        Some(s) => s.trim().parse::<u64>().map_err(|e| StoreError::Corruption {
            key: key.to_string(),
            reason: format!("counter is not an unsigned integer: {e}"),
        }),
    }
}
