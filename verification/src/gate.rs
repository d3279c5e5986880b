//! Request orchestration: rate check, proof verification, recording.

use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use gate_ledger::VerificationLedger;
use gate_types::{Clock, UserId};

use crate::{
    Cooldown, Decision, GateObserver, NoopObserver, ProofVerifier, RateLimiter, VerifierVerdict,
    VerifyReply, VerifyRequest,
};

/// Generic detail returned when the verifier could not be reached.
const VERIFIER_UNAVAILABLE: &str = "verification service unavailable, please try again later";

/// Terminal result of one submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The proof was valid. Recording may still have failed; see logs.
    Accepted,
    /// Still inside the cooldown window; the verifier was not called.
    Denied { remaining: Duration, detail: String },
    /// The verifier (or request validation) rejected the proof.
    Rejected {
        code: String,
        attribute: Option<String>,
        detail: String,
    },
    /// The verifier could not be reached. The request may be retried.
    Failed { detail: String },
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }

    /// Client-facing reply for this outcome.
    pub fn to_reply(&self) -> VerifyReply {
        match self {
            Outcome::Accepted => VerifyReply::success(),
            Outcome::Denied { detail, .. } => VerifyReply::failure("rate_limited", detail.clone()),
            Outcome::Rejected {
                code,
                attribute,
                detail,
            } => VerifyReply {
                attribute: Some(attribute.clone()),
                ..VerifyReply::failure(code.clone(), detail.clone())
            },
            Outcome::Failed { detail } => {
                VerifyReply::failure("verification_unavailable", detail.clone())
            }
        }
    }
}

/// Gates proof submissions behind the cooldown and records successes.
pub struct VerificationGate {
    ledger: VerificationLedger,
    limiter: RateLimiter,
    verifier: Arc<dyn ProofVerifier>,
    clock: Arc<dyn Clock>,
    count_verifications: bool,
    observer: Arc<dyn GateObserver>,
}

impl VerificationGate {
    pub fn new(
        ledger: VerificationLedger,
        cooldown: Cooldown,
        verifier: Arc<dyn ProofVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            limiter: RateLimiter::new(ledger.clone(), cooldown),
            ledger,
            verifier,
            clock,
            count_verifications: true,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Enable or disable the global success counter (enabled by default).
    pub fn with_global_count(mut self, enabled: bool) -> Self {
        self.count_verifications = enabled;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn GateObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn ledger(&self) -> &VerificationLedger {
        &self.ledger
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run one submission to completion.
    ///
    /// Never fails: every path ends in an [`Outcome`].
    pub async fn submit(&self, request: &VerifyRequest) -> Outcome {
        self.observer.request();

        let user = match UserId::parse(request.proof.nullifier_hash.clone()) {
            Ok(user) => user,
            Err(e) => {
                self.observer.rejected();
                return Outcome::Rejected {
                    code: "invalid_request".to_string(),
                    attribute: Some("nullifier_hash".to_string()),
                    detail: e.to_string(),
                };
            }
        };

        let span = tracing::info_span!("verify", user = %user.short());
        self.process(&user, request).instrument(span).await
    }

    async fn process(&self, user: &UserId, request: &VerifyRequest) -> Outcome {
        let now = self.clock.now();
        let decision = self.limiter.check(user, now, self.observer.as_ref()).await;

        if let Decision::Denied { remaining } = decision {
            tracing::info!(remaining_ms = remaining.as_millis() as u64, "verification denied by cooldown");
            self.observer.denied();
            return Outcome::Denied {
                remaining,
                detail: self.limiter.denial_message(remaining),
            };
        }

        let verdict = self
            .verifier
            .verify(&request.proof, request.signal.as_deref())
            .await;

        match verdict {
            Ok(VerifierVerdict::Accepted) => {
                self.record_success(user).await;
                self.observer.accepted();
                tracing::info!(verifier = self.verifier.name(), "proof accepted");
                Outcome::Accepted
            }
            Ok(VerifierVerdict::Rejected {
                code,
                attribute,
                detail,
            }) => {
                self.observer.rejected();
                tracing::info!(%code, "proof rejected by verifier");
                Outcome::Rejected {
                    code,
                    attribute,
                    detail,
                }
            }
            Err(e) => {
                self.observer.verifier_failed();
                tracing::warn!(verifier = self.verifier.name(), error = %e, "proof verifier unavailable");
                Outcome::Failed {
                    detail: VERIFIER_UNAVAILABLE.to_string(),
                }
            }
        }
    }

    /// Write the success back. Failures are logged, never surfaced: the
    /// proof was valid regardless of whether bookkeeping succeeded.
    async fn record_success(&self, user: &UserId) {
        let at = self.clock.now();
        if let Err(e) = self.ledger.record_verification(user, at).await {
            self.observer.backend_write_failed();
            tracing::error!(error = %e, "failed to record verification time");
        }
        if self.count_verifications {
            match self.ledger.increment_global_count().await {
                Ok(total) => tracing::debug!(total, "global verification count incremented"),
                Err(e) => {
                    self.observer.backend_write_failed();
                    tracing::error!(error = %e, "failed to increment global verification count");
                }
            }
        }
    }
}
