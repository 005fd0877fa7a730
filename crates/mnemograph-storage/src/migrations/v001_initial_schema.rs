//! v001: memories, connections, implications, sync state, and digests.

use rusqlite::Connection;

use mnemograph_core::errors::MnemoResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> MnemoResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS memories (
            id                   TEXT PRIMARY KEY,
            user_id              TEXT NOT NULL,
            content              TEXT NOT NULL,
            embedding            BLOB,
            embedding_dims       INTEGER,
            abstract_embedding   BLOB,
            abstract_dims        INTEGER,
            source               TEXT NOT NULL,
            source_date          TEXT NOT NULL,
            contact_ids          TEXT NOT NULL DEFAULT '[]',
            significance_weight  REAL NOT NULL,
            strength             REAL NOT NULL,
            activation_count     INTEGER NOT NULL,
            last_activated_at    TEXT NOT NULL,
            created_at           TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_memories_user ON memories(user_id);

        CREATE TABLE IF NOT EXISTS connections (
            memory_a_id         TEXT NOT NULL,
            memory_b_id         TEXT NOT NULL,
            connection_type     TEXT NOT NULL,
            weight              REAL NOT NULL,
            reason              TEXT NOT NULL,
            created_at          TEXT NOT NULL,
            last_coactivated_at TEXT NOT NULL,
            PRIMARY KEY (memory_a_id, memory_b_id)
        );

        CREATE INDEX IF NOT EXISTS idx_connections_a ON connections(memory_a_id);
        CREATE INDEX IF NOT EXISTS idx_connections_b ON connections(memory_b_id);

        CREATE TABLE IF NOT EXISTS implications (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL,
            content             TEXT NOT NULL,
            embedding           BLOB,
            embedding_dims      INTEGER,
            implication_type    TEXT NOT NULL,
            implication_order   INTEGER NOT NULL,
            source_memory_ids   TEXT NOT NULL,
            strength            REAL NOT NULL,
            created_at          TEXT NOT NULL,
            last_reinforced_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_implications_user ON implications(user_id);

        CREATE TABLE IF NOT EXISTS sync_states (
            id                TEXT PRIMARY KEY,
            user_id           TEXT NOT NULL,
            source_kind       TEXT NOT NULL,
            last_processed_at TEXT,
            UNIQUE (user_id, source_kind)
        );

        CREATE TABLE IF NOT EXISTS sync_state_processed (
            sync_state_id TEXT NOT NULL REFERENCES sync_states(id) ON DELETE CASCADE,
            source_id     TEXT NOT NULL,
            PRIMARY KEY (sync_state_id, source_id)
        );

        CREATE TABLE IF NOT EXISTS digests (
            id           TEXT PRIMARY KEY,
            user_id      TEXT NOT NULL,
            digest_date  TEXT NOT NULL,
            started_at   TEXT NOT NULL,
            finished_at  TEXT,
            counts_json  TEXT NOT NULL,
            summary      TEXT NOT NULL DEFAULT '',
            UNIQUE (user_id, digest_date)
        );

        CREATE TABLE IF NOT EXISTS digest_snippets (
            digest_id TEXT NOT NULL REFERENCES digests(id) ON DELETE CASCADE,
            position  INTEGER NOT NULL,
            kind      TEXT NOT NULL,
            summary   TEXT NOT NULL,
            PRIMARY KEY (digest_id, position)
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
