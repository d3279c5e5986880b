//! Verification ledger.
//!
//! Durable record of the last successful verification per user, plus a
//! global count of successes. The ledger holds no state of its own: every
//! call reads or writes through the configured [`gate_store::KvBackend`], so
//! any number of gate instances sharing a backend observe the same records.
//!
//! Storage layout, one backend key per user:
//!
//! ```text
//! verified_at:<user id>   -> last success, decimal Unix milliseconds
//! verified_total          -> total successes, decimal integer
//! ```

pub mod error;
pub mod ledger;

pub use error::LedgerError;
pub use ledger::{user_key, VerificationLedger, GLOBAL_COUNT_KEY, USER_KEY_PREFIX};
