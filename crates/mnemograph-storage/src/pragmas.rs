//! PRAGMA configuration applied to every connection (spec §9 design
//! notes: WAL for single-writer/multi-reader concurrency at personal
//! scale). Grounded on `cortex-storage/src/pool/pragmas.rs`.

use rusqlite::Connection;

use mnemograph_core::errors::MnemoResult;

use crate::to_storage_err;

/// Applied to the single writer connection.
pub fn apply_write_pragmas(conn: &Connection) -> MnemoResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA mmap_size = 268435456;
        PRAGMA cache_size = -64000;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Applied to each read-pool connection. `query_only` keeps a stray write
/// query in a read path from silently succeeding against the WAL file.
pub fn apply_read_pragmas(conn: &Connection) -> MnemoResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA query_only = ON;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
