//! Relay gate node: the composition root.
//!
//! The node:
//! - Loads configuration and opens the selected storage backend
//! - Builds the verification gate around the ledger and the proof verifier
//! - Exports gate events as Prometheus metrics
//! - Serves the HTTP API until shutdown, then closes the backend

pub mod backend;
pub mod config;
pub mod error;
pub mod inspect;
pub mod metrics;
pub mod node;
pub mod shutdown;

pub use backend::open_backend;
pub use config::{BackendConfig, GateConfig, VerifierSettings};
pub use error::NodeError;
pub use inspect::{inspect, InspectReport};
pub use metrics::GateMetrics;
pub use node::GateNode;
pub use shutdown::ShutdownController;
