//! Verification gate.
//!
//! Decides whether a proof-of-personhood submission may proceed, hands
//! admitted proofs to the external verifier, and records successes:
//!
//! ```text
//! Received -> RateChecked -> Denied
//!                         -> ProofVerifying -> ProofAccepted -> Recorded
//!                                           -> ProofRejected
//! ```
//!
//! The verifier is a pluggable [`ProofVerifier`]; production deployments use
//! [`WorldIdVerifier`], which calls the World ID cloud verification API.

pub mod error;
pub mod gate;
pub mod limiter;
pub mod observer;
pub mod proof;
pub mod reply;
pub mod verifier;
pub mod world_id;

pub use error::VerifierError;
pub use gate::{Outcome, VerificationGate};
pub use limiter::{Cooldown, Decision, RateLimiter};
pub use observer::{GateObserver, NoopObserver};
pub use proof::{ProofPayload, VerifyRequest};
pub use reply::VerifyReply;
pub use verifier::{ProofVerifier, VerifierVerdict};
pub use world_id::{hash_signal, VerifierConfig, WorldIdVerifier};
