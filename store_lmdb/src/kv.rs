//! LMDB implementation of [`KvBackend`].
//!
//! LMDB serializes write transactions across threads and processes, so the
//! read-add-write inside one write transaction makes `increment` atomic.
//! Every operation runs on the blocking thread pool, and at most
//! [`MAX_CONCURRENT_TXNS`] of them at once so the reader table never fills.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use gate_store::{parse_counter, KvBackend, StoreError};

use crate::{LmdbEnvironment, LmdbError, MAX_READERS};

/// Transactions allowed in flight per store. Half the reader table, leaving
/// slots for other processes sharing the environment.
pub const MAX_CONCURRENT_TXNS: usize = (MAX_READERS / 2) as usize;

pub struct LmdbKvStore {
    path: PathBuf,
    inner: RwLock<Option<LmdbEnvironment>>,
    txn_permits: Arc<Semaphore>,
}

impl LmdbKvStore {
    /// Open (or create) the store in `path`.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        let env = LmdbEnvironment::open(path, map_size)?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: RwLock::new(Some(env)),
            txn_permits: Arc::new(Semaphore::new(MAX_CONCURRENT_TXNS)),
        })
    }

    fn handle(&self) -> Result<LmdbEnvironment, StoreError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("LMDB handle lock poisoned".to_string()))?;
        guard.clone().ok_or(StoreError::Closed)
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&LmdbEnvironment) -> Result<T, StoreError> + Send + 'static,
    {
        let permit = self
            .txn_permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| StoreError::Closed)?;
        let env = self.handle()?;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            op(&env)
        })
            .await
            .map_err(|e| StoreError::Backend(format!("LMDB task failed: {e}")))?
    }
}

#[async_trait]
impl KvBackend for LmdbKvStore {
    fn name(&self) -> &'static str {
        "lmdb"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        self.blocking(move |env| {
            let rtxn = env.env().read_txn().map_err(LmdbError::from)?;
            let val = env
                .kv_db
                .get(&rtxn, &key)
                .map_err(LmdbError::from)?
                .map(str::to_string);
            Ok(val)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        let value = value.to_string();
        self.blocking(move |env| {
            let mut wtxn = env.env().write_txn().map_err(LmdbError::from)?;
            env.kv_db
                .put(&mut wtxn, &key, &value)
                .map_err(LmdbError::from)?;
            wtxn.commit().map_err(LmdbError::from)?;
            Ok(())
        })
        .await
    }

    async fn increment(&self, key: &str) -> Result<u64, StoreError> {
        let key = key.to_string();
        self.blocking(move |env| {
            let mut wtxn = env.env().write_txn().map_err(LmdbError::from)?;
            let current = {
                let raw = env.kv_db.get(&wtxn, &key).map_err(LmdbError::from)?;
                parse_counter(&key, raw)?
            };
            let next = current
                .checked_add(1)
                .ok_or_else(|| StoreError::Overflow(key.clone()))?;
            env.kv_db
                .put(&mut wtxn, &key, &next.to_string())
                .map_err(LmdbError::from)?;
            wtxn.commit().map_err(LmdbError::from)?;
            Ok(next)
        })
        .await
    }

    async fn close(&self) -> Result<(), StoreError> {
        let taken = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("LMDB handle lock poisoned".to_string()))?
            .take();
        if let Some(env) = taken {
            let closing = env.into_closing();
            tokio::task::spawn_blocking(move || closing.wait())
                .await
                .map_err(|e| StoreError::Backend(format!("LMDB close task failed: {e}")))?;
            tracing::info!(path = %self.path.display(), "closed LMDB environment");
        }
        Ok(())
    }
}
