//! `StorageEngine` — owns the [`ConnectionPool`], implements
//! [`IVectorStore`] + [`IGraphStore`] + [`IImplicationStore`], plus the
//! `SyncState`/`Digest` inherent methods. Grounded on
//! `cortex-storage/src/engine.rs::StorageEngine`.

use std::path::Path;

use mnemograph_core::errors::MnemoResult;

use crate::migrations;
use crate::pool::ConnectionPool;

pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> MnemoResult<Self> {
        let pool = ConnectionPool::open(path, ConnectionPool::default_read_pool_size())?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> MnemoResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> MnemoResult<()> {
        self.pool.with_writer(|conn| migrations::run_migrations(conn))
    }

    pub(crate) fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}
