//! Top-level error type for value validation.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("user id is {len} bytes, maximum is {max}")]
    UserIdTooLong { len: usize, max: usize },

    #[error("user id contains control characters")]
    UserIdControlChars,

    #[error("unknown verification level: {0}")]
    UnknownLevel(String),
}
