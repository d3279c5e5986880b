//! HTTP API for the relay gate.
//!
//! Provides endpoints for:
//! - Proof submission (`POST /api/verify`)
//! - Verification statistics (`GET /api/stats`)
//! - Liveness (`GET /health`)
//! - Prometheus metrics (`GET /metrics`)

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{ApiState, RpcServer};
