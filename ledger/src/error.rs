use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("corrupted record for {user}: {reason}")]
    CorruptRecord { user: String, reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] gate_store::StoreError),
}
