//! Opens the storage backend named by the configuration.

use std::sync::Arc;
use std::time::Duration;

use gate_nullables::NullStore;
use gate_store::SharedBackend;
use gate_store_lmdb::LmdbKvStore;
use gate_store_remote::{RestConfig, RestKvStore};

use crate::config::BackendConfig;
use crate::NodeError;

const MIB: usize = 1024 * 1024;

/// Open (and for remote stores, ping) the configured backend.
///
/// Failure here is fatal for the gate: it refuses to start rather than run
/// with no place to record verifications.
pub async fn open_backend(config: &BackendConfig) -> Result<SharedBackend, NodeError> {
    match config {
        BackendConfig::Lmdb { path, map_size_mb } => {
            if *map_size_mb == 0 {
                return Err(NodeError::Config("map_size_mb must be positive".to_string()));
            }
            let store = LmdbKvStore::open(path, map_size_mb * MIB)?;
            tracing::info!(path = %path.display(), map_size_mb, "opened LMDB backend");
            Ok(Arc::new(store))
        }
        BackendConfig::Memory => {
            tracing::warn!("using in-memory backend, verification records will not survive a restart");
            Ok(Arc::new(NullStore::new()))
        }
        BackendConfig::Rest {
            url,
            token,
            request_timeout_secs,
        } => {
            let rest = RestConfig {
                request_timeout: Duration::from_secs(*request_timeout_secs),
                ..RestConfig::new(url.clone(), token.clone())
            };
            Ok(Arc::new(RestKvStore::connect(rest).await?))
        }
    }
}
