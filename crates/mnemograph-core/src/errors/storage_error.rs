/// Errors from the vector store (C3), graph store (C6), and implication
/// store (C7) — these three share one SQLite-backed pool (spec §4.3,
/// §4.6, §4.7), so they share one error type.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("migration failed: {0}")]
    MigrationFailed(String),

    #[error("pool exhausted waiting for a {kind} connection")]
    PoolExhausted { kind: &'static str },

    #[error("serialization error: {0}")]
    Serialization(String),
}
