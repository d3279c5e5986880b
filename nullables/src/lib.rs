//! Nullable infrastructure for deterministic testing and single-process
//! deployments.
//!
//! External dependencies (clock, storage, the proof verifier) are abstracted
//! behind traits. This crate provides implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! [`NullStore`] doubles as the `memory` storage backend: an in-process
//! cache with a real atomic counter, suitable when a single gate process
//! owns all state and losing it on restart is acceptable.

pub mod clock;
pub mod store;
pub mod verifier;

pub use clock::NullClock;
pub use store::NullStore;
pub use verifier::NullVerifier;
