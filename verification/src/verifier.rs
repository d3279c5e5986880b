//! Pluggable proof verifier.

use async_trait::async_trait;

use crate::{ProofPayload, VerifierError};

/// What the verifier concluded about a proof it managed to check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifierVerdict {
    Accepted,
    /// Machine-readable rejection, propagated to the client verbatim.
    Rejected {
        code: String,
        attribute: Option<String>,
        detail: String,
    },
}

/// An external oracle that checks proof-of-personhood proofs.
///
/// The gate never parses proofs itself. Transport failures are returned as
/// [`VerifierError`] and are distinct from a semantic rejection.
#[async_trait]
pub trait ProofVerifier: Send + Sync {
    /// Human-readable name of this verifier.
    fn name(&self) -> &str;

    async fn verify(
        &self,
        proof: &ProofPayload,
        signal: Option<&str>,
    ) -> Result<VerifierVerdict, VerifierError>;
}
