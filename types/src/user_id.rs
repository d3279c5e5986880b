//! User identifier derived from a proof's nullifier hash.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// An opaque, pseudonymous user identifier.
///
/// In practice this is the World ID nullifier hash (`0x`-prefixed hex), but
/// the gate treats it as an opaque lookup key and never interprets it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Longest identifier accepted, in bytes.
    pub const MAX_LEN: usize = 256;

    /// Validate and wrap a raw identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if s.is_empty() {
            return Err(TypesError::EmptyUserId);
        }
        if s.len() > Self::MAX_LEN {
            return Err(TypesError::UserIdTooLong {
                len: s.len(),
                max: Self::MAX_LEN,
            });
        }
        if s.chars().any(char::is_control) {
            return Err(TypesError::UserIdControlChars);
        }
        Ok(Self(s))
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines, e.g. `0x1a2b…9f0e`.
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 14 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}
