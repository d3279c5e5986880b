//! Cooldown rate limiting.
//!
//! A user may verify again once a full cooldown window has elapsed since
//! their last recorded success. The window is evaluated at read time; stored
//! records never expire.

use std::time::Duration;

use gate_ledger::{LedgerError, VerificationLedger};
use gate_types::{Timestamp, UserId};
use gate_utils::{describe_duration, format_hms};

use crate::GateObserver;

/// Minimum time between two successful verifications of the same user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cooldown(Duration);

impl Cooldown {
    /// One verification per day.
    pub const DAILY: Self = Self(Duration::from_secs(24 * 60 * 60));

    pub fn new(window: Duration) -> Self {
        Self(window)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn window(&self) -> Duration {
        self.0
    }

    /// Window length in words, e.g. `24 hours`.
    pub fn describe(&self) -> String {
        describe_duration(self.0)
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::DAILY
    }
}

/// Admit or deny a verification attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied { remaining: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    /// Pure decision from the last recorded success.
    ///
    /// - no record: allowed
    /// - `elapsed >= window`: allowed (the boundary itself is allowed)
    /// - otherwise denied for `window - elapsed`
    /// - a record later than `now` (clock skew): denied for the full window
    pub fn evaluate(last: Option<Timestamp>, now: Timestamp, cooldown: Cooldown) -> Self {
        let Some(last) = last else {
            return Decision::Allowed;
        };
        let window = cooldown.window();
        if window.is_zero() {
            return Decision::Allowed;
        }
        match last.elapsed_until(now) {
            Some(elapsed) if elapsed >= window => Decision::Allowed,
            Some(elapsed) => Decision::Denied {
                remaining: window - elapsed,
            },
            None => Decision::Denied { remaining: window },
        }
    }
}

/// Reads the ledger and applies the cooldown window.
#[derive(Clone)]
pub struct RateLimiter {
    ledger: VerificationLedger,
    cooldown: Cooldown,
}

impl RateLimiter {
    pub fn new(ledger: VerificationLedger, cooldown: Cooldown) -> Self {
        Self { ledger, cooldown }
    }

    pub fn cooldown(&self) -> Cooldown {
        self.cooldown
    }

    /// Decide for `user` at `now`, surfacing ledger failures.
    pub async fn evaluate(&self, user: &UserId, now: Timestamp) -> Result<Decision, LedgerError> {
        let last = self.ledger.last_verification(user).await?;
        Ok(Decision::evaluate(last, now, self.cooldown))
    }

    /// Decide for `user` at `now`, failing open.
    ///
    /// If the ledger cannot be read the user is treated as never seen and
    /// the attempt is ALLOWED: while the backend is down, the cooldown is
    /// not enforced. Every such bypass is logged at `warn` and reported to
    /// `observer`.
    pub async fn check(
        &self,
        user: &UserId,
        now: Timestamp,
        observer: &dyn GateObserver,
    ) -> Decision {
        match self.evaluate(user, now).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(
                    user = %user.short(),
                    error = %e,
                    "ledger read failed, admitting without cooldown check"
                );
                observer.backend_read_failed();
                Decision::Allowed
            }
        }
    }

    /// User-facing message for a denial.
    pub fn denial_message(&self, remaining: Duration) -> String {
        format!(
            "Verification is only allowed once every {}. Please wait {}",
            self.cooldown.describe(),
            format_hms(remaining)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoopObserver;
    use gate_nullables::NullStore;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct ReadFailures(AtomicU32);

    impl GateObserver for ReadFailures {
        fn backend_read_failed(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    const MIN: Duration = Duration::from_secs(60);

    fn five_minutes() -> Cooldown {
        Cooldown::new(5 * MIN)
    }

    #[test]
    fn never_seen_is_allowed() {
        assert_eq!(
            Decision::evaluate(None, Timestamp::new(0), Cooldown::DAILY),
            Decision::Allowed
        );
    }

    #[test]
    fn inside_window_is_denied_with_remaining() {
        let last = Timestamp::new(1_000_000);
        let now = Timestamp::new(1_000_000 + 90_000);
        assert_eq!(
            Decision::evaluate(Some(last), now, five_minutes()),
            Decision::Denied {
                remaining: Duration::from_millis(210_000)
            }
        );
    }

    #[test]
    fn exact_boundary_is_allowed() {
        let last = Timestamp::new(1_000_000);
        let now = Timestamp::new(1_000_000 + 300_000);
        assert!(Decision::evaluate(Some(last), now, five_minutes()).is_allowed());
        let just_before = Timestamp::new(1_000_000 + 299_999);
        assert_eq!(
            Decision::evaluate(Some(last), just_before, five_minutes()),
            Decision::Denied {
                remaining: Duration::from_millis(1)
            }
        );
    }

    #[test]
    fn future_record_denies_full_window() {
        let last = Timestamp::new(2_000_000);
        let now = Timestamp::new(1_000_000);
        assert_eq!(
            Decision::evaluate(Some(last), now, five_minutes()),
            Decision::Denied {
                remaining: 5 * MIN
            }
        );
    }

    #[test]
    fn zero_window_never_denies() {
        let last = Timestamp::new(2_000_000);
        assert!(Decision::evaluate(Some(last), Timestamp::new(0), Cooldown::new(Duration::ZERO)).is_allowed());
    }

    #[test]
    fn denial_message_names_window_and_wait() {
        let ledger = VerificationLedger::new(Arc::new(NullStore::new()));
        let limiter = RateLimiter::new(ledger, Cooldown::DAILY);
        assert_eq!(
            limiter.denial_message(Duration::from_millis(3_723_500)),
            "Verification is only allowed once every 24 hours. Please wait 1:02:03"
        );
    }

    #[tokio::test]
    async fn check_reads_through_ledger() {
        let store = Arc::new(NullStore::new());
        let ledger = VerificationLedger::new(store.clone());
        let user = UserId::parse("u1").unwrap();
        ledger.record_verification(&user, Timestamp::new(10_000)).await.unwrap();

        let limiter = RateLimiter::new(ledger, five_minutes());
        assert_eq!(
            limiter.check(&user, Timestamp::new(70_000), &NoopObserver).await,
            Decision::Denied {
                remaining: Duration::from_secs(240)
            }
        );
        assert!(limiter
            .check(&user, Timestamp::new(310_000), &NoopObserver)
            .await
            .is_allowed());
    }

    #[tokio::test]
    async fn unreadable_backend_fails_open() {
        let store = Arc::new(NullStore::new());
        let ledger = VerificationLedger::new(store.clone());
        let user = UserId::parse("u1").unwrap();
        ledger.record_verification(&user, Timestamp::new(10_000)).await.unwrap();
        store.set_read_failure(true);

        let limiter = RateLimiter::new(ledger, five_minutes());
        assert!(limiter.evaluate(&user, Timestamp::new(20_000)).await.is_err());

        let reads = ReadFailures::default();
        assert!(limiter
            .check(&user, Timestamp::new(20_000), &reads)
            .await
            .is_allowed());
        assert_eq!(reads.0.load(Ordering::SeqCst), 1);
    }
}
