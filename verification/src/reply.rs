//! Client-facing result shape.

use serde::Serialize;

/// JSON reply returned to the kiosk:
/// `{ success, code?, attribute?: string|null, detail? }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerifyReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Absent when not applicable; `null` when the verifier named no attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerifyReply {
    pub fn success() -> Self {
        Self {
            success: true,
            code: None,
            attribute: None,
            detail: None,
        }
    }

    pub fn failure(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code.into()),
            attribute: None,
            detail: Some(detail.into()),
        }
    }
}
