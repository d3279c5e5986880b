use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid REST backend configuration: {0}")]
    Config(String),

    #[error("could not reach REST backend: {0}")]
    Unreachable(String),

    #[error("REST backend request failed: {0}")]
    RequestFailed(String),

    #[error("REST backend returned an error: {0}")]
    Command(String),

    #[error("invalid REST backend response: {0}")]
    InvalidResponse(String),
}

impl From<RemoteError> for gate_store::StoreError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::Unreachable(_) => gate_store::StoreError::Unavailable(e.to_string()),
            other => gate_store::StoreError::Backend(other.to_string()),
        }
    }
}
