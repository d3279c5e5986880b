//! Proof material submitted by the kiosk client.

use gate_types::VerificationLevel;
use serde::{Deserialize, Serialize};

/// The proof produced by the World ID widget, passed through untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPayload {
    /// Pseudonymous per-app identity; used as the user id.
    pub nullifier_hash: String,
    pub merkle_root: String,
    pub proof: String,
    pub verification_level: VerificationLevel,
}

/// A verification request: the proof plus the optional signal it commits to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub proof: ProofPayload,
    #[serde(default)]
    pub signal: Option<String>,
}
