//! Abstract storage trait for the relay gate.
//!
//! Every storage backend (LMDB file, in-process map, managed REST store)
//! implements [`KvBackend`]. The ledger depends only on the trait, and the
//! concrete backend is chosen once at startup.

pub mod backend;
pub mod error;

pub use backend::{parse_counter, KvBackend, SharedBackend};
pub use error::StoreError;
