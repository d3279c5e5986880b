//! LMDB storage backend for the relay gate.
//!
//! Implements [`gate_store::KvBackend`] using the `heed` LMDB bindings. All
//! keys live in one named database inside a single environment directory,
//! so the whole verification ledger is one file on disk that survives
//! restarts and can be shared by several processes on the same host.
//!
//! Read transactions are opened with `MDB_NOTLS` (heed's `read-txn-no-tls`
//! feature): the reader slot belongs to the transaction, not the blocking
//! thread that happened to run it, and is freed when the transaction ends.

pub mod environment;
pub mod error;
pub mod kv;

pub use environment::{LmdbEnvironment, CURRENT_SCHEMA_VERSION, MAX_READERS};
pub use error::LmdbError;
pub use kv::LmdbKvStore;
