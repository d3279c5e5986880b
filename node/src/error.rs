use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] gate_ledger::LedgerError),

    #[error("store error: {0}")]
    Store(#[from] gate_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] gate_store_lmdb::LmdbError),

    #[error("REST store error: {0}")]
    Remote(#[from] gate_store_remote::RemoteError),

    #[error("verifier error: {0}")]
    Verifier(#[from] gate_verification::VerifierError),

    #[error("HTTP API error: {0}")]
    Rpc(#[from] gate_rpc::RpcError),

    #[error("invalid user id: {0}")]
    InvalidUser(#[from] gate_types::TypesError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
