//! Managed key-value backend for the relay gate.
//!
//! Talks to a hosted Redis through its REST command endpoint (the protocol
//! spoken by Upstash and Vercel KV): each command is a JSON array POSTed to
//! the base URL with a bearer token, and the reply is `{"result": ...}` or
//! `{"error": "..."}`. The counter uses the server's native `INCR`.

pub mod client;
pub mod error;

pub use client::{RestConfig, RestKvStore};
pub use error::RemoteError;
