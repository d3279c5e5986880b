//! Nullable store — thread-safe in-memory key-value backend.

use async_trait::async_trait;
use gate_store::{parse_counter, KvBackend, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory [`KvBackend`].
///
/// Thread-safe for use with tokio's multi-threaded runtime. Reads and writes
/// can be switched to fail with [`StoreError::Unavailable`] to simulate a
/// backend outage.
pub struct NullStore {
    entries: Mutex<HashMap<String, String>>,
    closed: AtomicBool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// A store whose every operation fails as if the backend were down.
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_read_failure(true);
        store.set_write_failure(true);
        store
    }

    /// Make `get` fail (or succeed again).
    pub fn set_read_failure(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make `set` and `increment` fail (or succeed again).
    pub fn set_write_failure(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Peek at a stored value without going through the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Store a value directly, bypassing failure switches.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("null store switched off".to_string()));
        }
        Ok(())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvBackend for NullStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check(&self.fail_reads)?;
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check(&self.fail_writes)?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<u64, StoreError> {
        self.check(&self.fail_writes)?;
        let mut entries = self.lock();
        let current = parse_counter(key, entries.get(key).map(String::as_str))?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| StoreError::Overflow(key.to_string()))?;
        entries.insert(key.to_string(), next.to_string());
        Ok(next)
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
