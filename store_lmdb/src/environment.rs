//! LMDB environment setup.

use std::path::Path;

use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

/// The schema version that the current code writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Reader slots in the lock table. Larger than tokio's default blocking
/// pool (512 threads) so every blocking thread can hold a read txn.
pub const MAX_READERS: u32 = 1024;

const KV_DB: &str = "kv";
const META_DB: &str = "meta";
const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Wraps the LMDB environment and its database handles.
///
/// Cloning is cheap: `heed::Env` is reference counted and database handles
/// are plain identifiers.
#[derive(Clone)]
pub struct LmdbEnvironment {
    env: Env,
    pub(crate) kv_db: Database<Str, Str>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    ///
    /// Refuses to open a database written by a newer schema version.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment directory is owned by this process tree and
        // is never opened twice within one process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(2)
                .max_readers(MAX_READERS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let kv_db: Database<Str, Str> = env.create_database(&mut wtxn, Some(KV_DB))?;
        let meta_db: Database<Str, Str> = env.create_database(&mut wtxn, Some(META_DB))?;

        let stored = match meta_db.get(&wtxn, SCHEMA_VERSION_KEY)? {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| LmdbError::Heed(format!("unreadable schema version: {e}")))?,
            None => 0,
        };
        if stored > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::SchemaTooNew {
                found: stored,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        if stored < CURRENT_SCHEMA_VERSION {
            tracing::info!(from = stored, to = CURRENT_SCHEMA_VERSION, "initialising schema");
            meta_db.put(&mut wtxn, SCHEMA_VERSION_KEY, &CURRENT_SCHEMA_VERSION.to_string())?;
        }
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(Self { env, kv_db })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Begin closing the environment. The files are released once every
    /// outstanding clone has been dropped; the returned event can be waited on.
    pub fn into_closing(self) -> heed::EnvClosingEvent {
        self.env.prepare_for_closing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_environment_records_schema_version() {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).expect("open env");
        let rtxn = env.env().read_txn().unwrap();
        let meta: Database<Str, Str> = env
            .env()
            .open_database(&rtxn, Some(META_DB))
            .unwrap()
            .expect("meta db exists");
        assert_eq!(meta.get(&rtxn, SCHEMA_VERSION_KEY).unwrap(), Some("1"));
    }
}
