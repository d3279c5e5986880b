//! Shared utilities for the relay gate.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{describe_duration, format_hms};
