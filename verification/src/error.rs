use thiserror::Error;

/// Failures reaching the proof verifier. A verifier that answered and
/// rejected the proof is not an error; see [`crate::VerifierVerdict`].
#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("invalid verifier configuration: {0}")]
    Config(String),

    #[error("verifier unreachable: {0}")]
    Unreachable(String),

    #[error("verifier request failed: {0}")]
    RequestFailed(String),

    #[error("invalid verifier response: {0}")]
    InvalidResponse(String),
}
