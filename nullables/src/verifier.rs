//! Nullable proof verifier — scripted verdicts without network access.

use async_trait::async_trait;
use gate_verification::{ProofPayload, ProofVerifier, VerifierError, VerifierVerdict};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A scripted proof verifier for testing.
///
/// Returns queued results in order; once the queue is empty it falls back to
/// accepting every proof. Counts how often it was asked.
pub struct NullVerifier {
    script: Mutex<VecDeque<Result<VerifierVerdict, VerifierError>>>,
    calls: AtomicUsize,
    last_signal: Mutex<Option<String>>,
}

impl NullVerifier {
    /// Accepts every proof.
    pub fn accepting() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            last_signal: Mutex::new(None),
        }
    }

    /// Rejects the next proof with `code` and `detail`, then accepts.
    pub fn rejecting(code: &str, detail: &str) -> Self {
        let verifier = Self::accepting();
        verifier.push(Ok(VerifierVerdict::Rejected {
            code: code.to_string(),
            attribute: None,
            detail: detail.to_string(),
        }));
        verifier
    }

    /// Fails the next call as if the verifier were unreachable, then accepts.
    pub fn unreachable() -> Self {
        let verifier = Self::accepting();
        verifier.push(Err(VerifierError::Unreachable(
            "null verifier switched off".to_string(),
        )));
        verifier
    }

    /// Queue a result for a future call.
    pub fn push(&self, result: Result<VerifierVerdict, VerifierError>) {
        self.script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push_back(result);
    }

    /// Number of times `verify` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Signal passed to the most recent call.
    pub fn last_signal(&self) -> Option<String> {
        self.last_signal
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

impl Default for NullVerifier {
    fn default() -> Self {
        Self::accepting()
    }
}

#[async_trait]
impl ProofVerifier for NullVerifier {
    fn name(&self) -> &str {
        "null-verifier"
    }

    async fn verify(
        &self,
        _proof: &ProofPayload,
        signal: Option<&str>,
    ) -> Result<VerifierVerdict, VerifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_signal.lock().unwrap_or_else(|p| p.into_inner()) = signal.map(str::to_string);
        self.script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front()
            .unwrap_or(Ok(VerifierVerdict::Accepted))
    }
}
