//! Operator view of one user's verification state.

use std::fmt;

use gate_ledger::VerificationLedger;
use gate_types::{Timestamp, UserId};
use gate_utils::format_hms;
use gate_verification::{Cooldown, Decision, RateLimiter};

use crate::NodeError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InspectReport {
    pub user: UserId,
    pub last_verified: Option<Timestamp>,
    pub decision: Decision,
    pub verified_total: u64,
}

/// Read a user's record and the global count without modifying anything.
///
/// Unlike the request path this does not fail open: an operator asking
/// about a user wants to see the backend error.
pub async fn inspect(
    ledger: &VerificationLedger,
    cooldown: Cooldown,
    user: &UserId,
    now: Timestamp,
) -> Result<InspectReport, NodeError> {
    let last_verified = ledger.last_verification(user).await?;
    let decision = RateLimiter::new(ledger.clone(), cooldown)
        .evaluate(user, now)
        .await?;
    let verified_total = ledger.global_count().await?;
    Ok(InspectReport {
        user: user.clone(),
        last_verified,
        decision,
        verified_total,
    })
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "user:           {}", self.user)?;
        match self.last_verified {
            Some(at) => writeln!(f, "last verified:  {} ms since epoch", at.as_millis())?,
            None => writeln!(f, "last verified:  never")?,
        }
        match self.decision {
            Decision::Allowed => writeln!(f, "cooldown:       clear")?,
            Decision::Denied { remaining } => {
                writeln!(f, "cooldown:       {} remaining", format_hms(remaining))?
            }
        }
        write!(f, "verified total: {}", self.verified_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_nullables::NullStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn user() -> UserId {
        UserId::parse("0x1234").unwrap()
    }

    #[tokio::test]
    async fn unknown_user_is_clear() {
        let ledger = VerificationLedger::new(Arc::new(NullStore::new()));
        let report = inspect(&ledger, Cooldown::DAILY, &user(), Timestamp::new(1_000))
            .await
            .unwrap();
        assert_eq!(report.last_verified, None);
        assert_eq!(report.decision, Decision::Allowed);
        assert_eq!(report.verified_total, 0);
        assert!(report.to_string().contains("never"));
    }

    #[tokio::test]
    async fn recent_user_shows_remaining_cooldown() {
        let ledger = VerificationLedger::new(Arc::new(NullStore::new()));
        ledger
            .record_verification(&user(), Timestamp::new(10_000))
            .await
            .unwrap();
        ledger.increment_global_count().await.unwrap();

        let report = inspect(
            &ledger,
            Cooldown::from_secs(3600),
            &user(),
            Timestamp::new(10_000 + 60_000),
        )
        .await
        .unwrap();
        assert_eq!(
            report.decision,
            Decision::Denied {
                remaining: Duration::from_secs(3540)
            }
        );
        assert_eq!(report.verified_total, 1);
        let text = report.to_string();
        assert!(text.contains("0:59:00 remaining"), "{text}");
        assert!(text.contains("verified total: 1"));
    }

    #[tokio::test]
    async fn backend_errors_surface() {
        let ledger = VerificationLedger::new(Arc::new(NullStore::unavailable()));
        let err = inspect(&ledger, Cooldown::DAILY, &user(), Timestamp::new(0))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::Ledger(_)));
    }
}
