use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("value at '{key}' is corrupted: {reason}")]
    Corruption { key: String, reason: String },

    #[error("counter at '{0}' overflowed")]
    Overflow(String),

    #[error("storage backend has been closed")]
    Closed,
}

impl StoreError {
    /// Whether the failure is plausibly transient (worth retrying later).
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}
