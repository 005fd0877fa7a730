//! Sequential, idempotent schema migrations (`CREATE TABLE IF NOT
//! EXISTS`), grounded on `cortex-storage/src/migrations/v004_causal_tables.rs`.
//! Every table this crate family needs is introduced in v001; later specs
//! append new `vNNN_*` modules rather than editing v001 in place.

mod v001_initial_schema;

use rusqlite::Connection;

use mnemograph_core::errors::MnemoResult;

pub fn run_migrations(conn: &Connection) -> MnemoResult<()> {
    v001_initial_schema::migrate(conn)
}
