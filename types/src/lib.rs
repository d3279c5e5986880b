//! Fundamental types for the relay gate.
//!
//! This crate defines the types shared across every other crate in the
//! workspace: user identifiers, millisecond timestamps, the clock seam and
//! the World ID verification level.

pub mod error;
pub mod level;
pub mod time;
pub mod user_id;

pub use error::TypesError;
pub use level::VerificationLevel;
pub use time::{Clock, SystemClock, Timestamp};
pub use user_id::UserId;
