//! Per-user verification records and the global success counter.

use gate_store::{parse_counter, SharedBackend, StoreError};
use gate_types::{Timestamp, UserId};

use crate::LedgerError;

/// Prefix of every per-user record key.
pub const USER_KEY_PREFIX: &str = "verified_at:";

/// Key of the global success counter. Cannot collide with a user key.
pub const GLOBAL_COUNT_KEY: &str = "verified_total";

/// Backend key holding `user`'s last verification time.
pub fn user_key(user: &UserId) -> String {
    format!("{USER_KEY_PREFIX}{}", user.as_str())
}

/// Reads and writes verification records through a shared backend.
#[derive(Clone)]
pub struct VerificationLedger {
    backend: SharedBackend,
}

impl VerificationLedger {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Time of `user`'s last successful verification, `None` if never.
    ///
    /// Reading never writes, so probing an unknown user leaves the backend
    /// untouched.
    pub async fn last_verification(&self, user: &UserId) -> Result<Option<Timestamp>, LedgerError> {
        let raw = self.backend.get(&user_key(user)).await?;
        match raw {
            None => Ok(None),
            Some(s) => s
                .parse::<Timestamp>()
                .map(Some)
                .map_err(|e| LedgerError::CorruptRecord {
                    user: user.to_string(),
                    reason: format!("timestamp {s:?} is not a millisecond count: {e}"),
                }),
        }
    }

    /// Record a successful verification for `user` at `at`.
    ///
    /// An existing record newer than `at` is kept, so a user's timestamp
    /// never moves backwards. Records for different users are independent
    /// keys and never interfere with each other.
    pub async fn record_verification(&self, user: &UserId, at: Timestamp) -> Result<(), LedgerError> {
        match self.last_verification(user).await {
            Ok(Some(existing)) if existing > at => {
                tracing::warn!(
                    user = %user.short(),
                    existing = existing.as_millis(),
                    attempted = at.as_millis(),
                    "keeping newer verification record"
                );
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(user = %user.short(), error = %e, "could not read previous record, overwriting");
            }
        }
        self.backend
            .set(&user_key(user), &at.as_millis().to_string())
            .await?;
        Ok(())
    }

    /// Atomically bump the global success counter, returning the new total.
    pub async fn increment_global_count(&self) -> Result<u64, LedgerError> {
        Ok(self.backend.increment(GLOBAL_COUNT_KEY).await?)
    }

    /// Current value of the global success counter (0 if never incremented).
    pub async fn global_count(&self) -> Result<u64, LedgerError> {
        let raw = self.backend.get(GLOBAL_COUNT_KEY).await?;
        parse_counter(GLOBAL_COUNT_KEY, raw.as_deref()).map_err(LedgerError::from)
    }

    /// Release the backend. Idempotent.
    pub async fn close(&self) -> Result<(), StoreError> {
        self.backend.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_nullables::NullStore;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn user(s: &str) -> UserId {
        UserId::parse(s).unwrap()
    }

    fn ledger() -> (Arc<NullStore>, VerificationLedger) {
        let store = Arc::new(NullStore::new());
        (store.clone(), VerificationLedger::new(store))
    }

    #[tokio::test]
    async fn unknown_user_is_absent_and_read_is_pure() {
        let (store, ledger) = ledger();
        for _ in 0..3 {
            assert_eq!(ledger.last_verification(&user("ghost")).await.unwrap(), None);
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn record_then_read_returns_same_timestamp() {
        let (store, ledger) = ledger();
        let u = user("0xabc");
        ledger.record_verification(&u, Timestamp::new(1_700_000_000_000)).await.unwrap();
        assert_eq!(
            ledger.last_verification(&u).await.unwrap(),
            Some(Timestamp::new(1_700_000_000_000))
        );
        assert_eq!(store.raw("verified_at:0xabc").as_deref(), Some("1700000000000"));
    }

    #[tokio::test]
    async fn users_are_independent_keys() {
        let (_store, ledger) = ledger();
        ledger.record_verification(&user("a"), Timestamp::new(10)).await.unwrap();
        ledger.record_verification(&user("b"), Timestamp::new(20)).await.unwrap();
        assert_eq!(ledger.last_verification(&user("a")).await.unwrap(), Some(Timestamp::new(10)));
        assert_eq!(ledger.last_verification(&user("b")).await.unwrap(), Some(Timestamp::new(20)));
    }

    #[tokio::test]
    async fn record_never_moves_backwards() {
        let (_store, ledger) = ledger();
        let u = user("u1");
        ledger.record_verification(&u, Timestamp::new(5_000)).await.unwrap();
        ledger.record_verification(&u, Timestamp::new(4_000)).await.unwrap();
        assert_eq!(ledger.last_verification(&u).await.unwrap(), Some(Timestamp::new(5_000)));
        ledger.record_verification(&u, Timestamp::new(6_000)).await.unwrap();
        assert_eq!(ledger.last_verification(&u).await.unwrap(), Some(Timestamp::new(6_000)));
    }

    #[tokio::test]
    async fn corrupt_record_is_reported_and_overwritten() {
        let (store, ledger) = ledger();
        let u = user("u1");
        store.insert_raw(&user_key(&u), "not-a-number");
        assert!(matches!(
            ledger.last_verification(&u).await,
            Err(LedgerError::CorruptRecord { .. })
        ));
        ledger.record_verification(&u, Timestamp::new(42)).await.unwrap();
        assert_eq!(ledger.last_verification(&u).await.unwrap(), Some(Timestamp::new(42)));
    }

    #[tokio::test]
    async fn user_named_like_counter_does_not_collide() {
        let (_store, ledger) = ledger();
        ledger.record_verification(&user(GLOBAL_COUNT_KEY), Timestamp::new(99)).await.unwrap();
        assert_eq!(ledger.global_count().await.unwrap(), 0);
        assert_eq!(ledger.increment_global_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn global_count_defaults_to_zero() {
        let (_store, ledger) = ledger();
        assert_eq!(ledger.global_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn read_failure_is_returned_not_hidden() {
        let (store, ledger) = ledger();
        ledger
            .record_verification(&user("u1"), Timestamp::new(1_000))
            .await
            .unwrap();
        store.set_read_failure(true);
        assert!(matches!(
            ledger.last_verification(&user("u1")).await,
            Err(LedgerError::Storage(StoreError::Unavailable(_)))
        ));
        assert!(ledger.global_count().await.is_err());
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let (store, ledger) = ledger();
        store.set_write_failure(true);
        assert!(matches!(
            ledger.record_verification(&user("u1"), Timestamp::new(1)).await,
            Err(LedgerError::Storage(StoreError::Unavailable(_)))
        ));
        assert!(ledger.increment_global_count().await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_global_increments_yield_exactly_one_to_n() {
        let (_store, ledger) = ledger();
        let tasks = (0..100).map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.increment_global_count().await.unwrap() })
        });
        let results: Vec<u64> = futures_util::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        let distinct: BTreeSet<u64> = results.iter().copied().collect();
        assert_eq!(results.len(), distinct.len());
        assert_eq!(distinct, (1..=100).collect::<BTreeSet<u64>>());
        assert_eq!(ledger.global_count().await.unwrap(), 100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_global_increments_on_lmdb() {
        let dir = tempfile::tempdir().unwrap();
        let store = gate_store_lmdb::LmdbKvStore::open(dir.path(), 16 * 1024 * 1024).unwrap();
        let ledger = VerificationLedger::new(Arc::new(store));
        let tasks = (0..50).map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.increment_global_count().await.unwrap() })
        });
        let distinct: BTreeSet<u64> = futures_util::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(distinct, (1..=50).collect::<BTreeSet<u64>>());
        ledger.close().await.unwrap();
    }
}
