//! World ID verification levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// The credential strength a proof was generated with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationLevel {
    Orb,
    SecureDocument,
    Document,
    Device,
}

impl VerificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationLevel::Orb => "orb",
            VerificationLevel::SecureDocument => "secure_document",
            VerificationLevel::Document => "document",
            VerificationLevel::Device => "device",
        }
    }
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationLevel {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orb" => Ok(VerificationLevel::Orb),
            "secure_document" => Ok(VerificationLevel::SecureDocument),
            "document" => Ok(VerificationLevel::Document),
            "device" => Ok(VerificationLevel::Device),
            other => Err(TypesError::UnknownLevel(other.to_string())),
        }
    }
}
