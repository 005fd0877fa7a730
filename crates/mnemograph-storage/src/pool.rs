//! Single-writer, multi-reader connection pool (spec §9 design notes).
//! Grounded on `cortex-storage/src/pool/{mod,read_pool}.rs`: one
//! `Mutex`-guarded writer connection, a small round-robin pool of
//! read-only connections that never block on the writer thanks to WAL.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::Connection;

use mnemograph_core::errors::MnemoResult;

use crate::pragmas::{apply_read_pragmas, apply_write_pragmas};
use crate::to_storage_err;

const DEFAULT_READ_POOL_SIZE: usize = 4;
const MAX_READ_POOL_SIZE: usize = 8;

pub struct ConnectionPool {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    next_reader: AtomicUsize,
    /// In-memory databases give the writer and each reader an isolated
    /// instance, so reads must go through the writer in that mode.
    use_read_pool: bool,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    pub fn open(path: &Path, read_pool_size: usize) -> MnemoResult<Self> {
        let writer = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_write_pragmas(&writer)?;

        let size = read_pool_size.clamp(1, MAX_READ_POOL_SIZE);
        let mut readers = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(
                path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
            apply_read_pragmas(&conn)?;
            readers.push(Mutex::new(conn));
        }

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            next_reader: AtomicUsize::new(0),
            use_read_pool: true,
            db_path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> MnemoResult<Self> {
        let writer = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_write_pragmas(&writer)?;
        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            next_reader: AtomicUsize::new(0),
            use_read_pool: false,
            db_path: None,
        })
    }

    pub fn default_read_pool_size() -> usize {
        DEFAULT_READ_POOL_SIZE
    }

    pub fn with_writer<F, T>(&self, f: F) -> MnemoResult<T>
    where
        F: FnOnce(&Connection) -> MnemoResult<T>,
    {
        let guard = self
            .writer
            .lock()
            .map_err(|e| to_storage_err(format!("writer lock poisoned: {e}")))?;
        f(&guard)
    }

    pub fn with_reader<F, T>(&self, f: F) -> MnemoResult<T>
    where
        F: FnOnce(&Connection) -> MnemoResult<T>,
    {
        if !self.use_read_pool || self.readers.is_empty() {
            return self.with_writer(f);
        }
        let idx = self.next_reader.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let guard = self.readers[idx]
            .lock()
            .map_err(|e| to_storage_err(format!("reader lock poisoned: {e}")))?;
        f(&guard)
    }
}
