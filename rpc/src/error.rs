//! RPC error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use gate_verification::VerifyReply;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid CORS origin {origin:?}: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("store error: {0}")]
    Store(String),

    #[error("metrics encoding error: {0}")]
    Metrics(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<gate_ledger::LedgerError> for RpcError {
    fn from(e: gate_ledger::LedgerError) -> Self {
        RpcError::Store(e.to_string())
    }
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            RpcError::InvalidRequest(_) => "invalid_request",
            RpcError::Store(_) => "store_unavailable",
            _ => "internal_error",
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = VerifyReply::failure(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}
