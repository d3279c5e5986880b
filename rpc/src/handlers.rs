//! HTTP request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;

use gate_verification::{Outcome, VerifyRequest};

use crate::error::RpcError;
use crate::server::ApiState;

// ── Verify ───────────────────────────────────────────────────────────────

/// HTTP status for each gate outcome.
pub fn outcome_status(outcome: &Outcome) -> StatusCode {
    match outcome {
        Outcome::Accepted => StatusCode::OK,
        Outcome::Denied { .. } => StatusCode::TOO_MANY_REQUESTS,
        Outcome::Rejected { .. } => StatusCode::BAD_REQUEST,
        Outcome::Failed { .. } => StatusCode::BAD_GATEWAY,
    }
}

pub async fn verify(
    State(state): State<ApiState>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Response, RpcError> {
    let Json(request) = body.map_err(|e| RpcError::InvalidRequest(e.body_text()))?;
    let outcome = state.gate.submit(&request).await;
    Ok((outcome_status(&outcome), Json(outcome.to_reply())).into_response())
}

// ── Stats ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub verified_total: u64,
}

pub async fn stats(State(state): State<ApiState>) -> Result<Json<StatsResponse>, RpcError> {
    let verified_total = state.gate.ledger().global_count().await?;
    Ok(Json(StatsResponse { verified_total }))
}

// ── Health / metrics ─────────────────────────────────────────────────────

pub async fn health() -> &'static str {
    "ok"
}

pub async fn metrics(State(state): State<ApiState>) -> Result<Response, RpcError> {
    let Some(registry) = state.registry.as_ref() else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    encoder
        .encode(&registry.gather(), &mut buf)
        .map_err(|e| RpcError::Metrics(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buf,
    )
        .into_response())
}
